//! Build-component registry: which Jira components map to a buildable repository.

use crate::errors::{Result, TrackerError};
use std::collections::BTreeSet;

/// One repository known to the build tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepo {
    pub path: String,
    pub component: String,
    pub id: u32,
}

impl GitRepo {
    pub fn new(path: &str, component: &str, id: u32) -> Self {
        Self {
            path: path.to_string(),
            component: component.to_string(),
            id,
        }
    }
}

/// Selector for [`StaticRegistry::find_repo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoLookup<'a> {
    Path(&'a str),
    Component(&'a str),
    Id(u32),
}

impl<'a> RepoLookup<'a> {
    /// Build a selector from an attribute name, for callers that only have strings.
    pub fn parse(attribute: &str, value: &'a str) -> Result<Self> {
        match attribute {
            "path" => Ok(RepoLookup::Path(value)),
            "component" => Ok(RepoLookup::Component(value)),
            "id" => value
                .parse()
                .map(RepoLookup::Id)
                .map_err(|_| TrackerError::UnknownAttribute(format!("id={}", value))),
            other => Err(TrackerError::UnknownAttribute(other.to_string())),
        }
    }

    fn matches(&self, repo: &GitRepo) -> bool {
        match *self {
            RepoLookup::Path(path) => repo.path == path,
            RepoLookup::Component(component) => repo.component == component,
            RepoLookup::Id(id) => repo.id == id,
        }
    }
}

pub trait ComponentRegistry: Send + Sync {
    fn is_build_component(&self, name: &str) -> bool;

    /// Distinct component names, sorted.
    fn list_components(&self) -> BTreeSet<String>;
}

const GLOSS_REPOS: &[(&str, &str, u32)] = &[
    ("GLOSS/gloss_repo", "IPE", 712),
    ("GLOSS/BPS", "BPS", 1279),
    ("GLOSS/CREST", "CREST", 1298),
    ("GLOSS/SWIFT", "SWIFT", 1299),
    ("GLOSS/PRINT", "PRINT", 1292),
    ("GLOSS/dds", "ACDDM", 2654),
    ("GLOSS/TRAX", "TRAX", 1293),
    ("GLOSS/esb", "EAI", 1534),
    ("GLOSS/EB_283", "EB_283", 1288),
    ("GLOSS/EURO", "EURO", 1297),
    ("GLOSS/Gloss-FIFO", "FIFO", 1280),
    ("GLOSS/CC_169", "CC_169", 1285),
    ("GLOSS/CTM", "CTM", 1538),
    ("GLOSS/CCASS", "CCASS", 1294),
    ("GLOSS/tmi", "TMI", 4217),
    ("GLOSS/gloss-te", "TE", 941),
    ("GLOSS/te-core", "TE", 2528),
    ("GLOSSjava/gpm", "PP", 2637),
    ("GLOSSjava/gpl", "PP", 2640),
    ("GLOSSjava/integrity-check", "PP", 2649),
    ("GLOSSjava/master-build", "PP", 2646),
    ("GLOSSjava/gsl", "PP", 2639),
    ("GLOSSjava/jec", "PP", 2641),
    ("GLOSSjava/framework", "PP", 2636),
    ("GLOSSjava/mob", "PP", 2644),
    ("GLOSSjava/mor", "PP", 2645),
    ("GLOSSjava/rebuilder", "PP", 2647),
    ("GLOSSjava/cfs", "PP", 2643),
    ("GLOSSjava/product-installer", "Product_Installer", 2546),
    ("GLOSSjava/ccpne", "CCPNE", 2652),
];

/// Fixed repository table. `Default` yields the GLOSS build table.
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    repos: Vec<GitRepo>,
    components: BTreeSet<String>,
}

impl StaticRegistry {
    pub fn new(repos: Vec<GitRepo>) -> Self {
        let components = repos.iter().map(|r| r.component.clone()).collect();
        Self { repos, components }
    }

    pub fn repos(&self) -> &[GitRepo] {
        &self.repos
    }

    /// First repository matching the selector.
    pub fn find_repo(&self, lookup: RepoLookup<'_>) -> Option<&GitRepo> {
        self.repos.iter().find(|repo| lookup.matches(repo))
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::new(
            GLOSS_REPOS
                .iter()
                .map(|(path, component, id)| GitRepo::new(path, component, *id))
                .collect(),
        )
    }
}

impl ComponentRegistry for StaticRegistry {
    fn is_build_component(&self, name: &str) -> bool {
        self.components.contains(name)
    }

    fn list_components(&self) -> BTreeSet<String> {
        self.components.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_repo_by_component_returns_first_match() {
        let registry = StaticRegistry::default();

        let repo = registry.find_repo(RepoLookup::Component("BPS")).unwrap();
        assert_eq!(repo.path, "GLOSS/BPS");
        assert_eq!(repo.id, 1279);

        // TE has two repos; the first one wins
        let repo = registry.find_repo(RepoLookup::Component("TE")).unwrap();
        assert_eq!(repo.path, "GLOSS/gloss-te");
    }

    #[test]
    fn test_find_repo_by_path_and_id() {
        let registry = StaticRegistry::default();
        assert_eq!(
            registry.find_repo(RepoLookup::Path("GLOSSjava/ccpne")).unwrap().component,
            "CCPNE"
        );
        assert_eq!(
            registry.find_repo(RepoLookup::Id(4217)).unwrap().component,
            "TMI"
        );
        assert!(registry.find_repo(RepoLookup::Id(1)).is_none());
    }

    #[test]
    fn test_parse_lookup_rejects_unknown_attribute() {
        assert_eq!(
            RepoLookup::parse("component", "PP").unwrap(),
            RepoLookup::Component("PP")
        );
        assert_eq!(RepoLookup::parse("id", "712").unwrap(), RepoLookup::Id(712));

        let err = RepoLookup::parse("owner", "me").unwrap_err();
        assert!(matches!(err, TrackerError::UnknownAttribute(name) if name == "owner"));
        assert!(RepoLookup::parse("id", "abc").is_err());
    }

    #[test]
    fn test_list_components_is_distinct_and_sorted() {
        let registry = StaticRegistry::default();
        let components: Vec<String> = registry.list_components().into_iter().collect();

        let mut expected = components.clone();
        expected.sort();
        expected.dedup();
        assert_eq!(components, expected);

        assert_eq!(components.iter().filter(|c| *c == "PP").count(), 1);
        assert_eq!(components.first().map(String::as_str), Some("ACDDM"));
        assert!(registry.is_build_component("Product_Installer"));
        assert!(!registry.is_build_component("Documentation"));
    }

    #[test]
    fn test_custom_registry() {
        let registry = StaticRegistry::new(vec![GitRepo::new("group/app", "APP", 1)]);
        assert!(registry.is_build_component("APP"));
        assert!(!registry.is_build_component("IPE"));
        assert_eq!(registry.repos().len(), 1);
    }
}
