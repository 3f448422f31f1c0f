//! In-memory ref container for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use gitpool_types::ObjectId;

use crate::error::RefResult;
use crate::names::check_ref_name;
use crate::traits::RefsContainer;
use crate::types::RefTarget;

/// `HashMap`-based ref container holding one repository's refs.
///
/// The guarded operations check and write under a single lock guard, so
/// they have the same single-winner behavior as the database variant.
#[derive(Default)]
pub struct MemoryRefsContainer {
    refs: RwLock<HashMap<String, RefTarget>>,
    peeled: RwLock<HashMap<String, ObjectId>>,
}

impl MemoryRefsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every ref. Used by registry deletion.
    pub fn clear(&self) {
        self.refs.write().expect("lock poisoned").clear();
    }
}

#[async_trait]
impl RefsContainer for MemoryRefsContainer {
    async fn list_names(&self) -> RefResult<Vec<String>> {
        let mut names: Vec<String> = self
            .refs
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    async fn read(&self, name: &str) -> RefResult<Option<RefTarget>> {
        Ok(self.refs.read().expect("lock poisoned").get(name).cloned())
    }

    async fn compare_and_swap(
        &self,
        name: &str,
        expected_old: Option<&RefTarget>,
        new_target: RefTarget,
    ) -> RefResult<bool> {
        let (real, _) = self.follow(name).await?;
        check_ref_name(&real)?;
        let mut refs = self.refs.write().expect("lock poisoned");
        if let Some(expected) = expected_old {
            if refs.get(&real) != Some(expected) {
                return Ok(false);
            }
        }
        refs.insert(real, new_target);
        Ok(true)
    }

    async fn add_if_absent(&self, name: &str, target: RefTarget) -> RefResult<bool> {
        check_ref_name(name)?;
        let mut refs = self.refs.write().expect("lock poisoned");
        if refs.contains_key(name) {
            return Ok(false);
        }
        refs.insert(name.to_string(), target);
        Ok(true)
    }

    async fn remove_if_equals(
        &self,
        name: &str,
        expected_old: Option<&RefTarget>,
    ) -> RefResult<bool> {
        let mut refs = self.refs.write().expect("lock poisoned");
        if let Some(expected) = expected_old {
            if refs.get(name) != Some(expected) {
                return Ok(false);
            }
        }
        refs.remove(name);
        Ok(true)
    }

    async fn set_symbolic(&self, name: &str, other: &str) -> RefResult<()> {
        check_ref_name(name)?;
        check_ref_name(other)?;
        self.refs
            .write()
            .expect("lock poisoned")
            .insert(name.to_string(), RefTarget::Symbolic(other.to_string()));
        Ok(())
    }

    fn peeled(&self, name: &str) -> Option<ObjectId> {
        self.peeled.read().expect("lock poisoned").get(name).copied()
    }

    fn record_peeled(&self, name: &str, id: ObjectId) {
        self.peeled
            .write()
            .expect("lock poisoned")
            .insert(name.to_string(), id);
    }
}
