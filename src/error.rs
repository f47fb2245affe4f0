use thiserror::Error;

pub type Result<T> = std::result::Result<T, InvariantError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    #[error("list records {recorded} nodes but {reachable} are reachable from head")]
    LengthMismatch { recorded: usize, reachable: usize },

    #[error("cached tail is not the last reachable node (position {position})")]
    TailMismatch { position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_mismatch_message() {
        let err = InvariantError::LengthMismatch { recorded: 3, reachable: 2 };
        assert_eq!(
            err.to_string(),
            "list records 3 nodes but 2 are reachable from head"
        );
    }

    #[test]
    fn tail_mismatch_message() {
        let err = InvariantError::TailMismatch { position: 4 };
        assert_eq!(
            err.to_string(),
            "cached tail is not the last reachable node (position 4)"
        );
    }
}
