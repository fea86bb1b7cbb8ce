use spinsight_core::Pid;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The proctype name of a process descriptor such as `calc:1` or `:init::1`.
pub fn base_name(descriptor: &str) -> &str {
    descriptor
        .trim()
        .trim_start_matches(':')
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
}

/// Assigns display labels to processes while a transcript is read.
///
/// Instances of an ordinal template (`calc` by default) share the same descriptor text,
/// so each is numbered in order of first appearance: `calc[1]`, `calc[2]`, ...
#[derive(Debug, Clone, Default)]
pub struct ProcessLabeler {
    templates: BTreeSet<String>,
    ordinals: BTreeMap<String, Vec<Pid>>,
    names: HashMap<Pid, String>,
}

impl ProcessLabeler {
    /// Creates a [`ProcessLabeler`] numbering the instances of the given templates.
    pub fn new<I, S>(templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            templates: templates.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Registers the name given to `pid` when it was created.
    pub fn register(&mut self, pid: Pid, name: &str) {
        let name = base_name(name);
        if !name.is_empty() {
            self.names.insert(pid, name.to_owned());
        }
    }

    /// Label of process `pid` appearing with `descriptor`.
    ///
    /// Without a usable descriptor, the last name seen for `pid`
    /// (in a descriptor or at creation) is used, and failing that `proc_<pid>`.
    pub fn label(&mut self, pid: Pid, descriptor: Option<&str>) -> String {
        if let Some(name) = descriptor.map(base_name).filter(|name| !name.is_empty()) {
            self.names.insert(pid, name.to_owned());
        }
        let Some(base) = self.names.get(&pid).cloned() else {
            return format!("proc_{pid}");
        };
        if base == "init" || !self.templates.contains(&base) {
            return base;
        }
        let instances = self.ordinals.entry(base.clone()).or_default();
        let ordinal = match instances.iter().position(|&known| known == pid) {
            Some(idx) => idx + 1,
            None => {
                instances.push(pid);
                instances.len()
            }
        };
        format!("{base}[{ordinal}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_names() {
        assert_eq!(base_name(":init::1"), "init");
        assert_eq!(base_name("calc:1"), "calc");
        assert_eq!(base_name(" ring "), "ring");
        assert_eq!(base_name(""), "");
    }

    #[test]
    fn ordinals_by_first_appearance() {
        let mut labeler = ProcessLabeler::new(["calc"]);
        assert_eq!(labeler.label(0, Some(":init::1")), "init");
        assert_eq!(labeler.label(3, Some("calc:1")), "calc[1]");
        assert_eq!(labeler.label(1, Some("calc:1")), "calc[2]");
        assert_eq!(labeler.label(3, Some("calc:1")), "calc[1]");
        assert_eq!(labeler.label(2, Some("user:1")), "user");
    }

    #[test]
    fn fallback_names() {
        let mut labeler = ProcessLabeler::new(["calc"]);
        labeler.register(4, "calc");
        assert_eq!(labeler.label(4, Some("")), "calc[1]");
        assert_eq!(labeler.label(5, None), "proc_5");
    }

    #[test]
    fn descriptor_names_are_remembered() {
        let mut labeler = ProcessLabeler::new(["calc"]);
        assert_eq!(labeler.label(1, Some("calc:1")), "calc[1]");
        assert_eq!(labeler.label(1, None), "calc[1]");
        assert_eq!(labeler.label(2, Some("user:1")), "user");
        assert_eq!(labeler.label(2, Some("")), "user");
        assert_eq!(labeler.label(2, None), "user");
    }
}
