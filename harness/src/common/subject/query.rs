//! # Resource Queries
//!
//! File: harness/src/common/subject/query.rs
//! Author: Christi Mahu
//!
//! Listings of every resource of one kind the subject currently knows about,
//! one entry per output line. Used by the cleanup sweep and by tests that
//! compare state before and after a command.
//!
use crate::common::process::stdout_as_lines;
use crate::option::TestOption;

/// Full IDs of all containers, running or not.
pub fn get_all_container_ids(o: &TestOption) -> Vec<String> {
    stdout_as_lines(o, ["ps", "--all", "--quiet", "--no-trunc"])
}

/// IDs of all images, including intermediate ones.
pub fn get_all_image_ids(o: &TestOption) -> Vec<String> {
    stdout_as_lines(o, ["images", "--all", "--quiet"])
}

/// `repository:tag` of all images.
pub fn get_all_image_names(o: &TestOption) -> Vec<String> {
    stdout_as_lines(o, ["images", "--all", "--format", "{{.Repository}}:{{.Tag}}"])
}

/// Names of all volumes.
pub fn get_all_volume_names(o: &TestOption) -> Vec<String> {
    stdout_as_lines(o, ["volume", "ls", "--quiet"])
}

/// Names of all networks, including the built-in ones.
pub fn get_all_network_names(o: &TestOption) -> Vec<String> {
    stdout_as_lines(o, ["network", "ls", "--format", "{{.Name}}"])
}

// --- Unit Tests ---
#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::common::subject::testing::FakeSubject;

    #[test]
    fn test_queries_issue_listing_commands() {
        let fake = FakeSubject::new();
        fake.set("containers", &["c1", "c2"]);
        fake.set("image_ids", &["i1"]);
        fake.set("image_names", &["alpine:latest"]);
        fake.set("volumes", &[]);
        fake.set("networks", &["bridge", "host", "none", "test-network"]);

        let o = fake.option();
        assert_eq!(get_all_container_ids(o), ["c1", "c2"]);
        assert_eq!(get_all_image_ids(o), ["i1"]);
        assert_eq!(get_all_image_names(o), ["alpine:latest"]);
        assert!(get_all_volume_names(o).is_empty());
        assert_eq!(get_all_network_names(o).len(), 4);

        assert_eq!(
            fake.calls(),
            [
                "ps --all --quiet --no-trunc",
                "images --all --quiet",
                "images --all --format {{.Repository}}:{{.Tag}}",
                "volume ls --quiet",
                "network ls --format {{.Name}}",
            ]
        );
    }
}
