use thiserror::Error;

/// Top-level error type for the contact and wrench distribution crates.
#[derive(Debug, Error)]
pub enum ClankersError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    #[error("Distribution error: {0}")]
    Distribution(#[from] DistributionError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Duplicate vertex table: {0}")]
    DuplicateVertices(String),
}

/// Contact construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContactError {
    #[error("{kind} vertex table not found: {name}")]
    MissingVertices { kind: &'static str, name: String },

    #[error("Invalid friction coefficient: {0} (must be finite and >= 0)")]
    InvalidFrictionCoeff(f64),
}

/// Wrench distribution errors.
///
/// A solve that does not converge is not an error: the backend result is
/// kept as-is and reported through the distribution state.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("QP backend failure: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clankers_error_from_contact_error() {
        let err = ContactError::MissingVertices {
            kind: "Surface",
            name: "foot".into(),
        };
        let clankers_err: ClankersError = err.into();
        assert!(matches!(clankers_err, ClankersError::Contact(_)));
        assert!(clankers_err.to_string().contains("foot"));
    }

    #[test]
    fn clankers_error_from_distribution_error() {
        let err = DistributionError::Backend("bad settings".into());
        let clankers_err: ClankersError = err.into();
        assert!(matches!(clankers_err, ClankersError::Distribution(_)));
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            ContactError::MissingVertices {
                kind: "Grasp",
                name: "hand".into()
            }
            .to_string(),
            "Grasp vertex table not found: hand"
        );
        assert_eq!(
            ContactError::InvalidFrictionCoeff(-0.5).to_string(),
            "Invalid friction coefficient: -0.5 (must be finite and >= 0)"
        );
        assert_eq!(
            ConfigError::InvalidValue {
                field: "regular_weight".into(),
                message: "must be >= 0".into()
            }
            .to_string(),
            "Invalid value for regular_weight: must be >= 0"
        );
        assert_eq!(
            ConfigError::DuplicateVertices("foot".into()).to_string(),
            "Duplicate vertex table: foot"
        );
        assert_eq!(
            DistributionError::Backend("setup failed".into()).to_string(),
            "QP backend failure: setup failed"
        );
    }
}
