#![forbid(unsafe_code)]

pub mod profile {
    use std::fmt;
    use std::str::FromStr;

    /// Shape of the `tests` table and which derived structures are maintained next to it.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum SchemaProfile {
        /// Question/answer records only.
        Plain,
        /// Records carry a required topic and section.
        Categorized,
        /// Categorized records plus the `metadata` autocomplete index.
        #[default]
        Indexed,
    }

    impl SchemaProfile {
        pub const ALL: [SchemaProfile; 3] = [
            SchemaProfile::Plain,
            SchemaProfile::Categorized,
            SchemaProfile::Indexed,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                SchemaProfile::Plain => "plain",
                SchemaProfile::Categorized => "categorized",
                SchemaProfile::Indexed => "indexed",
            }
        }

        pub fn parse(value: &str) -> Result<Self, ProfileParseError> {
            let value = value.trim();
            if value.is_empty() {
                return Err(ProfileParseError::Empty);
            }
            Self::ALL
                .into_iter()
                .find(|profile| profile.as_str().eq_ignore_ascii_case(value))
                .ok_or_else(|| ProfileParseError::Unknown(value.to_string()))
        }

        pub fn is_categorized(self) -> bool {
            matches!(self, SchemaProfile::Categorized | SchemaProfile::Indexed)
        }

        pub fn has_metadata_index(self) -> bool {
            matches!(self, SchemaProfile::Indexed)
        }
    }

    impl fmt::Display for SchemaProfile {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    impl FromStr for SchemaProfile {
        type Err = ProfileParseError;

        fn from_str(value: &str) -> Result<Self, Self::Err> {
            Self::parse(value)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ProfileParseError {
        Empty,
        Unknown(String),
    }

    impl fmt::Display for ProfileParseError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Empty => write!(f, "schema profile must not be empty"),
                Self::Unknown(value) => write!(
                    f,
                    "unknown schema profile {value:?} (expected plain, categorized or indexed)"
                ),
            }
        }
    }

    impl std::error::Error for ProfileParseError {}
}

pub mod model {
    /// Tag of a metadata entry. The tag doubles as the `tests` column it projects.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum MetadataKind {
        Topic,
        Section,
    }

    impl MetadataKind {
        pub const ALL: [MetadataKind; 2] = [MetadataKind::Topic, MetadataKind::Section];

        pub fn as_str(self) -> &'static str {
            match self {
                MetadataKind::Topic => "topic",
                MetadataKind::Section => "section",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            Self::ALL.into_iter().find(|kind| kind.as_str() == value)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct TestRecord {
        pub id: i64,
        pub topic: Option<String>,
        pub section: Option<String>,
        pub question: String,
        pub answer: String,
        pub created_at: String,
    }

    /// Fields of a record as submitted by a client.
    ///
    /// Every field is optional here: presence is enforced by the table's `NOT NULL`
    /// constraints, so a missing field is a storage failure rather than a validation error.
    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct NewTestRecord {
        pub topic: Option<String>,
        pub section: Option<String>,
        pub question: Option<String>,
        pub answer: Option<String>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct TestFilter {
        topic: Option<String>,
        section: Option<String>,
    }

    impl TestFilter {
        /// Empty strings impose no constraint, same as an absent parameter.
        pub fn new(topic: Option<String>, section: Option<String>) -> Self {
            Self {
                topic: topic.filter(|value| !value.is_empty()),
                section: section.filter(|value| !value.is_empty()),
            }
        }

        pub fn topic(&self) -> Option<&str> {
            self.topic.as_deref()
        }

        pub fn section(&self) -> Option<&str> {
            self.section.as_deref()
        }

        pub fn is_empty(&self) -> bool {
            self.topic.is_none() && self.section.is_none()
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct MetadataSnapshot {
        pub topics: Vec<String>,
        pub sections: Vec<String>,
    }

    impl MetadataSnapshot {
        pub fn values(&self, kind: MetadataKind) -> &[String] {
            match kind {
                MetadataKind::Topic => &self.topics,
                MetadataKind::Section => &self.sections,
            }
        }
    }
}
