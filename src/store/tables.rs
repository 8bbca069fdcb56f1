//! Table and column names of the backend schema

/// Tables exposed through the REST endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Launches,
    Results,
    Versions,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Launches => "launches",
            Table::Results => "results",
            Table::Versions => "versions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionColumn {
    Id,
}

impl VersionColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            VersionColumn::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchColumn {
    Id,
    IsTemplate,
    Name,
}

impl LaunchColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            LaunchColumn::Id => "id",
            LaunchColumn::IsTemplate => "is_template",
            LaunchColumn::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultColumn {
    Id,
    Name,
    Suite,
    ParentSuite,
    Feature,
    LaunchId,
}

impl ResultColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultColumn::Id => "id",
            ResultColumn::Name => "name",
            ResultColumn::Suite => "suite",
            ResultColumn::ParentSuite => "parent_suite",
            ResultColumn::Feature => "feature",
            ResultColumn::LaunchId => "launch_id",
        }
    }
}

/// PostgREST equality filter as a query pair
pub fn eq(column: &str, value: impl std::fmt::Display) -> (String, String) {
    (column.to_string(), format!("eq.{}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filter() {
        assert_eq!(
            eq(ResultColumn::ParentSuite.as_str(), "Web UI"),
            ("parent_suite".to_string(), "eq.Web UI".to_string())
        );
        assert_eq!(eq(LaunchColumn::IsTemplate.as_str(), true).1, "eq.true");
    }
}
