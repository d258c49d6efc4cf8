pub mod connection;
pub mod datasets;

use clap::ValueEnum;

/// Storage partition. Scheduled scrapes land in `Main`; ad-hoc uploads go to
/// `User` so they never pollute the canonical datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DatasetKind {
    #[default]
    Main,
    User,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Main => "main",
            DatasetKind::User => "user",
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
