use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{0}")]
    Config(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Cannot read env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Clone failed: {0}")]
    Clone(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Git error: {0}")]
    Open(#[from] Box<gix::open::Error>),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
}

impl ReportError {
    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::Config(_) | ReportError::InvalidDate(_) | ReportError::EnvFile { .. } => 2,
            ReportError::Clone(_) => 3,
            ReportError::NotFound(_) => 4,
            ReportError::GitRepo(_)
            | ReportError::Open(_)
            | ReportError::ObjectFind(_)
            | ReportError::ObjectFindConv(_)
            | ReportError::Commit(_)
            | ReportError::ObjectDecode(_)
            | ReportError::DiffTreeToTree(_) => 5,
            ReportError::Serde(_) | ReportError::Io(_) => 1,
        }
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::open::Error> for ReportError {
    fn from(err: gix::open::Error) -> Self {
        ReportError::Open(Box::new(err))
    }
}

impl From<gix::object::find::existing::Error> for ReportError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        ReportError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for ReportError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        ReportError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for ReportError {
    fn from(err: gix::object::commit::Error) -> Self {
        ReportError::Commit(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for ReportError {
    fn from(err: gix::objs::decode::Error) -> Self {
        ReportError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for ReportError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        ReportError::DiffTreeToTree(Box::new(err))
    }
}
