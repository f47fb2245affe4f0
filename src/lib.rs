mod error;
mod linked_list;
mod node;

pub use error::{InvariantError, Result};
pub use linked_list::{Deletion, IntoIter, Iter, IterMut, List};
pub use node::Node;
