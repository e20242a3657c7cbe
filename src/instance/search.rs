//! Path lookup
//!
//! A lookup walks a [`Path`](super::Path) down from an instance, one segment
//! per container, list, leaf or leaf-list. List segments must carry the
//! values of every declared key. When a segment cannot be matched, the
//! caller's handler decides whether the lookup fails or yields nothing.

use crate::error::{Error, NoMatchReason, PathError, Result};

use super::path::{path_to_xpath, PathSegment};
use super::tree::{allow, InstanceRef, InstanceType};

/// A lookup that could not proceed
#[derive(Debug, Clone)]
pub struct NoMatch<'t, 'p> {
    /// Instance at which the lookup stopped
    pub instance: InstanceRef<'t>,
    /// Segments left unresolved
    pub remaining: &'p [PathSegment],
    /// Why the lookup stopped
    pub reason: NoMatchReason,
}

/// Handler failing the lookup with a [`PathError`]
pub fn fail_on_no_match(no_match: NoMatch<'_, '_>) -> Result<()> {
    Err(Error::Path(
        PathError::new(format!("Path not found below {}", no_match.instance.name()))
            .with_remaining(path_to_xpath(no_match.remaining))
            .with_reason(no_match.reason),
    ))
}

/// Handler turning an unmatched lookup into `None`
pub fn ignore_no_match(_: NoMatch<'_, '_>) -> Result<()> {
    Ok(())
}

impl<'t> InstanceRef<'t> {
    /// Find the instance addressed by `path`
    ///
    /// For containers, lists, leaves and leaf-lists the first segment names
    /// this instance. For a list entry the path continues below the entry.
    pub fn get_instance<'p, H>(&self, path: &'p [PathSegment], on_no_match: H) -> Result<Option<InstanceRef<'t>>>
    where
        H: FnOnce(NoMatch<'t, 'p>) -> Result<()>,
    {
        match self.instance_type() {
            InstanceType::ListChild => self.lookup_in_entry(path, on_no_match),
            InstanceType::LeafListChild if path.is_empty() => Ok(Some(*self)),
            InstanceType::LeafListChild => self.no_match(path, NoMatchReason::SegmentNotFound, on_no_match),
            _ => self.lookup_named(path, on_no_match),
        }
    }

    fn no_match<'p, H>(&self, remaining: &'p [PathSegment], reason: NoMatchReason, on_no_match: H) -> Result<Option<InstanceRef<'t>>>
    where
        H: FnOnce(NoMatch<'t, 'p>) -> Result<()>,
    {
        on_no_match(NoMatch {
            instance: *self,
            remaining,
            reason,
        })?;
        Ok(None)
    }

    fn lookup_in_entry<'p, H>(&self, rest: &'p [PathSegment], on_no_match: H) -> Result<Option<InstanceRef<'t>>>
    where
        H: FnOnce(NoMatch<'t, 'p>) -> Result<()>,
    {
        let Some(next) = rest.first() else {
            return Ok(Some(*self));
        };

        match self.find_child(&next.name) {
            Some(child) => child.get_instance(rest, on_no_match),
            None => self.no_match(rest, NoMatchReason::SegmentNotFound, on_no_match),
        }
    }

    fn lookup_named<'p, H>(&self, path: &'p [PathSegment], on_no_match: H) -> Result<Option<InstanceRef<'t>>>
    where
        H: FnOnce(NoMatch<'t, 'p>) -> Result<()>,
    {
        let head = match path.first() {
            Some(head) if self.schema().get_name(false) == head.name || self.get_name(true) == head.name => head,
            _ => return self.no_match(path, NoMatchReason::SegmentNotFound, on_no_match),
        };
        let rest = &path[1..];

        match self.instance_type() {
            InstanceType::Container => match rest.first() {
                None => Ok(Some(*self)),
                Some(next) => match self.find_child(&next.name) {
                    Some(child) => child.get_instance(rest, on_no_match),
                    None => self.no_match(rest, NoMatchReason::SegmentNotFound, on_no_match),
                },
            },
            InstanceType::Leaf if rest.is_empty() => Ok(Some(*self)),
            InstanceType::LeafList if rest.is_empty() => match head.value {
                None => Ok(Some(*self)),
                Some(ref value) => match self.item_refs().find(|item| item.raw_value(allow) == Some(value.as_str())) {
                    Some(item) => Ok(Some(item)),
                    None => self.no_match(path, NoMatchReason::ValueNotFound, on_no_match),
                },
            },
            InstanceType::List => self.lookup_entry(head, path, on_no_match),
            _ => self.no_match(rest, NoMatchReason::SegmentNotFound, on_no_match),
        }
    }

    fn lookup_entry<'p, H>(&self, head: &'p PathSegment, path: &'p [PathSegment], on_no_match: H) -> Result<Option<InstanceRef<'t>>>
    where
        H: FnOnce(NoMatch<'t, 'p>) -> Result<()>,
    {
        let Some(ref keys) = head.keys else {
            return if path.len() == 1 {
                Ok(Some(*self))
            } else {
                self.no_match(path, NoMatchReason::KeysRequired, on_no_match)
            };
        };

        let declared = self.schema().keys();

        if let Some(unknown) = keys.iter().find(|k| !declared.contains(&k.key)) {
            return self.no_match(path, NoMatchReason::UnknownKey(unknown.key.clone()), on_no_match);
        }
        if declared.iter().any(|d| !keys.iter().any(|k| &k.key == d)) {
            return self.no_match(path, NoMatchReason::KeysRequired, on_no_match);
        }

        let entry = self
            .node()
            .child_ids()
            .into_iter()
            .map(|id| InstanceRef::new(self.tree(), id))
            .find(|entry| keys.iter().all(|k| entry.key_value(&k.key) == Some(k.value.as_str())));

        match entry {
            Some(entry) => entry.lookup_in_entry(&path[1..], on_no_match),
            None => self.no_match(path, NoMatchReason::KeyValueNotFound, on_no_match),
        }
    }
}
