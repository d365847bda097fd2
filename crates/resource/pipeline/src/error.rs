//! Fatal pipeline faults

use thiserror::Error;

/// Boxed error used for collaborator failures the pipeline does not inspect.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An unrecovered failure that travels to the request boundary.
///
/// Faults are never translated into structured client errors. Expected
/// outcomes (not found, unauthorized, invalid body) are short-circuit
/// responses instead.
#[derive(Debug, Error)]
pub enum Fault {
    /// Storage collaborator failed outside the acceptable error class
    #[error("storage failure: {0}")]
    Storage(#[source] BoxError),

    /// A resolved value could not be narrowed to the requested capability
    #[error("cannot use {from} as {to}: {reason}")]
    Conversion {
        from: &'static str,
        to: &'static str,
        reason: String,
    },

    /// Owner and parent linkage of a record disagree
    #[error("inconsistent record linkage: {0}")]
    Linkage(String),

    /// A resource link could not be resolved into an absolute URL
    #[error("invalid location: {0}")]
    Location(String),

    /// Response body could not be encoded
    #[error("encoding failure: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Fault {
    /// Wrap any collaborator error as a storage fault.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Fault::Storage(Box::new(err))
    }

    /// Conversion failure from `U` to `M`.
    pub fn conversion<U, M>(reason: impl ToString) -> Self {
        Fault::Conversion {
            from: std::any::type_name::<U>(),
            to: std::any::type_name::<M>(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for fallible pipeline steps
pub type FaultResult<T> = Result<T, Fault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_names_both_types() {
        let fault = Fault::conversion::<u8, String>("not a string");
        let message = fault.to_string();
        assert!(message.contains("u8"));
        assert!(message.contains("String"));
        assert!(message.ends_with("not a string"));
    }

    #[test]
    fn test_storage_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let fault = Fault::storage(io);
        assert!(std::error::Error::source(&fault).is_some());
        assert_eq!(fault.to_string(), "storage failure: disk gone");
    }
}
