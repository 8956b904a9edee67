//! Host reachability validation and topology classification

use crate::core::{Result, SetupError, TopologyFailure, TopologyMode, ValidatedHosts};
use crate::hosts::ReachabilityProbe;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Probes every seed host in file order and classifies the reachable set.
pub struct TopologyValidator<P> {
    probe: P,
    require_reachable_master: bool,
}

impl<P: ReachabilityProbe> TopologyValidator<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            require_reachable_master: false,
        }
    }

    /// Also reject multi-host runs where the master itself did not answer.
    pub fn require_reachable_master(mut self, require: bool) -> Self {
        self.require_reachable_master = require;
        self
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Probe the hosts listed in `seed_host_file` and classify the result.
    ///
    /// Probes run one at a time in file order. Repeated hostnames are probed
    /// and kept as many times as they appear.
    pub fn validate<S: AsRef<Path>>(&self, seed_host_file: S, master: &str) -> Result<ValidatedHosts> {
        let seed_host_file = seed_host_file.as_ref();
        info!(seed = %seed_host_file.display(), "checking if the hosts are reachable");

        let candidates = read_seed_hosts(seed_host_file)?;
        let mut validated_hosts = Vec::new();
        let mut segment_hosts = Vec::new();

        for host in candidates {
            if !self.probe.probe(&host) {
                warn!(host = %host, "host is not reachable, skipping");
                continue;
            }
            debug!(host = %host, "host is reachable");
            if host != master {
                segment_hosts.push(host.clone());
            }
            validated_hosts.push(host);
        }

        debug!(count = validated_hosts.len(), "total hosts reachable");
        let mode = classify(
            seed_host_file,
            master,
            &validated_hosts,
            &segment_hosts,
            self.require_reachable_master,
        )?;
        info!(mode = %mode, hosts = validated_hosts.len(), segments = segment_hosts.len(), "topology validated");

        Ok(ValidatedHosts {
            mode,
            validated_hosts,
            segment_hosts,
        })
    }
}

/// Non-empty lines of the seed host file, in order.
pub fn read_seed_hosts<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| {
        SetupError::Provisioning(format!("Failed to read host file {}: {}", path.display(), e))
    })?;

    Ok(raw
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Decide single or multi mode from the reachable hosts.
///
/// Checks run in a fixed order: empty set, the one-host cases, then (multi
/// only) master presence when required, segment parity, segment presence.
/// Without `require_master` a multi-host set lacking the master is accepted
/// as long as the segment count is positive and even.
pub fn classify(
    seed_host_file: &Path,
    master: &str,
    validated_hosts: &[String],
    segment_hosts: &[String],
    require_master: bool,
) -> Result<TopologyMode> {
    match validated_hosts {
        [] => Err(TopologyFailure::NoReachableHosts {
            seed: seed_host_file.to_path_buf(),
        }
        .into()),
        [only] if only == master => Ok(TopologyMode::Single),
        [_] => Err(TopologyFailure::MasterUnreachable {
            seed: seed_host_file.to_path_buf(),
            master: master.to_string(),
        }
        .into()),
        hosts => {
            if require_master && !hosts.iter().any(|h| h == master) {
                return Err(TopologyFailure::MasterUnreachable {
                    seed: seed_host_file.to_path_buf(),
                    master: master.to_string(),
                }
                .into());
            }
            if segment_hosts.len() % 2 == 1 {
                return Err(TopologyFailure::OddSegmentCount(segment_hosts.len()).into());
            }
            if segment_hosts.is_empty() {
                return Err(TopologyFailure::NoSegmentHosts.into());
            }
            Ok(TopologyMode::Multi)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn seed_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("hostfile");
        fs::write(&path, content).unwrap();
        path
    }

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|h| h.to_string()).collect()
    }

    fn all_reachable(_: &str) -> bool {
        true
    }

    #[test]
    fn test_multi_master_plus_two_segments() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\ns1\ns2\n");

        let result = TopologyValidator::new(all_reachable).validate(&seed, "m1").unwrap();
        assert_eq!(result.mode, TopologyMode::Multi);
        assert_eq!(result.validated_hosts, hosts(&["m1", "s1", "s2"]));
        assert_eq!(result.segment_hosts, hosts(&["s1", "s2"]));
    }

    #[test]
    fn test_single_master_only() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\n");

        let result = TopologyValidator::new(all_reachable).validate(&seed, "m1").unwrap();
        assert_eq!(result.mode, TopologyMode::Single);
        assert_eq!(result.validated_hosts, hosts(&["m1"]));
        assert!(result.segment_hosts.is_empty());
    }

    #[test]
    fn test_single_when_only_master_answers() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "s1\nm1\ns2\n");

        let result = TopologyValidator::new(|h: &str| h == "m1")
            .validate(&seed, "m1")
            .unwrap();
        assert_eq!(result.mode, TopologyMode::Single);
        assert_eq!(result.validated_hosts, hosts(&["m1"]));
    }

    #[test]
    fn test_odd_segment_count_is_fatal() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\ns1\ns2\ns3\n");

        let err = TopologyValidator::new(all_reachable)
            .validate(&seed, "m1")
            .unwrap_err();
        assert_eq!(err.topology(), Some(&TopologyFailure::OddSegmentCount(3)));
    }

    #[test]
    fn test_empty_seed_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "\n\n");

        let err = TopologyValidator::new(all_reachable)
            .validate(&seed, "m1")
            .unwrap_err();
        assert!(matches!(
            err.topology(),
            Some(TopologyFailure::NoReachableHosts { .. })
        ));
    }

    #[test]
    fn test_nothing_reachable_is_fatal() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\ns1\ns2\n");

        let err = TopologyValidator::new(|_: &str| false)
            .validate(&seed, "m1")
            .unwrap_err();
        assert!(matches!(
            err.topology(),
            Some(TopologyFailure::NoReachableHosts { .. })
        ));
    }

    #[test]
    fn test_lone_segment_means_master_unreachable() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\ns1\n");

        let err = TopologyValidator::new(|h: &str| h == "s1")
            .validate(&seed, "m1")
            .unwrap_err();
        assert!(matches!(
            err.topology(),
            Some(TopologyFailure::MasterUnreachable { master, .. }) if master == "m1"
        ));
    }

    #[test]
    fn test_duplicate_master_leaves_no_segments() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\nm1\n");

        let err = TopologyValidator::new(all_reachable)
            .validate(&seed, "m1")
            .unwrap_err();
        assert_eq!(err.topology(), Some(&TopologyFailure::NoSegmentHosts));
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\ns1\ns1\n");

        let result = TopologyValidator::new(all_reachable).validate(&seed, "m1").unwrap();
        assert_eq!(result.validated_hosts, hosts(&["m1", "s1", "s1"]));
        assert_eq!(result.segment_hosts, hosts(&["s1", "s1"]));
    }

    #[test]
    fn test_multi_without_master_is_accepted_by_default() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\ns1\ns2\n");
        let segments_only = |h: &str| h != "m1";

        let result = TopologyValidator::new(segments_only).validate(&seed, "m1").unwrap();
        assert_eq!(result.mode, TopologyMode::Multi);
        assert_eq!(result.validated_hosts, hosts(&["s1", "s2"]));

        let err = TopologyValidator::new(segments_only)
            .require_reachable_master(true)
            .validate(&seed, "m1")
            .unwrap_err();
        assert!(matches!(
            err.topology(),
            Some(TopologyFailure::MasterUnreachable { .. })
        ));
    }

    #[test]
    fn test_probes_run_once_each_in_file_order() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "s2\n\nm1\ns1\ns3\n");
        let calls = RefCell::new(Vec::new());
        let recording = |h: &str| {
            calls.borrow_mut().push(h.to_string());
            h != "s3"
        };

        let result = TopologyValidator::new(recording).validate(&seed, "m1").unwrap();
        assert_eq!(*calls.borrow(), hosts(&["s2", "m1", "s1", "s3"]));
        assert_eq!(result.validated_hosts, hosts(&["s2", "m1", "s1"]));
        assert_eq!(result.segment_hosts, hosts(&["s2", "s1"]));
    }

    #[test]
    fn test_crlf_seed_file_matches_master() {
        let dir = TempDir::new().unwrap();
        let seed = seed_file(&dir, "m1\r\ns1\r\ns2\r\n");

        let result = TopologyValidator::new(all_reachable).validate(&seed, "m1").unwrap();
        assert_eq!(result.segment_hosts, hosts(&["s1", "s2"]));
    }

    #[test]
    fn test_missing_seed_file() {
        let dir = TempDir::new().unwrap();
        let err = TopologyValidator::new(all_reachable)
            .validate(dir.path().join("absent"), "m1")
            .unwrap_err();
        assert!(matches!(err, SetupError::Provisioning(_)));
    }

    #[test]
    fn test_classify_priority() {
        let seed = Path::new("hostfile");
        // parity is checked before emptiness of the segment list
        assert_eq!(
            classify(seed, "m1", &hosts(&["m1", "s1"]), &hosts(&["s1"]), false)
                .unwrap_err()
                .topology(),
            Some(&TopologyFailure::OddSegmentCount(1))
        );
        assert_eq!(
            classify(seed, "m1", &hosts(&["m1"]), &[], true).unwrap(),
            TopologyMode::Single
        );
    }
}
