use std::path::PathBuf;
use thiserror::Error;

/// Fatal error conditions raised while reading or rewriting Maven modules.
///
/// Every variant names the offending file, module key, or value; none of
/// them is recoverable within a single invocation.
#[derive(Debug, Error)]
pub enum MavenError {
    #[error("unable to determine parent module from '{}'", path.display())]
    MissingParentIdentifier { path: PathBuf },

    #[error("unable to determine module identifier (GAV) from '{}'", path.display())]
    MissingModuleIdentifier { path: PathBuf },

    #[error("unable to resolve property '{property}' in module '{module}'")]
    UnresolvedProperty { property: String, module: String },

    #[error("unable to determine parent module '{parent}' for module '{module}'")]
    MissingParentModule { parent: String, module: String },

    #[error("resolution of property '{property}' entered a parent cycle at module '{module}'")]
    ParentCycle { property: String, module: String },

    #[error("the project is expected to have a uniform version, but multiple versions were found: {}", versions.join(", "))]
    NonUniformVersions { versions: Vec<String> },

    #[error("version of module '{module}' ('{version}') is not a valid semantic version")]
    InvalidVersion { module: String, version: String },

    #[error("invalid custom version '{version}'")]
    InvalidCustomVersion { version: String },

    #[error("only Maven descriptors named 'pom.xml' are supported, got '{}'", path.display())]
    UnsupportedDescriptor { path: PathBuf },
}
