use serde::Deserialize;

/// A tracker project, only the fields needed to pick one
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

/// A tracked unit of work
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Story {
    pub id: u64,

    /// Pivotal Tracker calls this `name`
    #[serde(rename = "name")]
    pub title: String,
}

impl Story {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Sort projects for presentation: lexicographic by display name, id as tiebreak
pub fn sort_for_menu(projects: &mut [Project]) {
    projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}
