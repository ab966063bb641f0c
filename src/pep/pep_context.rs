//! # Context registry
//!
//! Every [`Vector`] and [`Scalar`] lives in the arena of a [`PepContext`] and is addressed by a
//! small copyable handle `(context uid, index)`. Handles compare, hash and order by identity,
//! so two basis vectors with the same tag are still different vectors; handle order is
//! construction order.
//!
//! The context also keeps
//! - the tag index used by `get_by_tag`,
//! - the ordered lists of basis Vectors and basis Scalars that fix the coordinates of the
//!   evaluation layer.
//!
//! [`ContextRegistry`] is a session of named contexts with an optional current one. It is an
//! ordinary value owned by the caller.

use crate::pep::pep_error::{PepError, PepResult};
use crate::pep::scalar::ScalarNode;
use crate::pep::vector::VectorNode;
use log::{debug, warn};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_UID: AtomicU64 = AtomicU64::new(1);

fn next_uid() -> u64 {
    NEXT_CONTEXT_UID.fetch_add(1, Ordering::Relaxed)
}

/// Handle of a vector node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vector {
    pub(crate) ctx: u64,
    pub(crate) index: usize,
}

/// Handle of a scalar node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scalar {
    pub(crate) ctx: u64,
    pub(crate) index: usize,
}

impl Vector {
    /// position in the arena of its context
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Scalar {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Result of a tag lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    Vector(Vector),
    Scalar(Scalar),
}

impl From<Vector> for Element {
    fn from(v: Vector) -> Self {
        Element::Vector(v)
    }
}

impl From<Scalar> for Element {
    fn from(s: Scalar) -> Self {
        Element::Scalar(s)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Element::Vector(v) => write!(f, "Vector#{}", v.index),
            Element::Scalar(s) => write!(f, "Scalar#{}", s.index),
        }
    }
}

/// Arena of Vector and Scalar nodes with the tag index and basis ordering.
#[derive(Debug)]
pub struct PepContext {
    name: String,
    uid: u64,
    vectors: Vec<VectorNode>,
    scalars: Vec<ScalarNode>,
    tag_index: HashMap<String, Element>,
    basis_vectors: Vec<Vector>,
    basis_scalars: Vec<Scalar>,
}

impl PepContext {
    pub fn new(name: &str) -> PepContext {
        let uid = next_uid();
        debug!("created PEP context {} (uid {})", name, uid);
        PepContext {
            name: name.to_string(),
            uid,
            vectors: Vec::new(),
            scalars: Vec::new(),
            tag_index: HashMap::new(),
            basis_vectors: Vec::new(),
            basis_scalars: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    ///////////////////////////////// NODES /////////////////////////////////////

    pub(crate) fn next_vector_index(&self) -> usize {
        self.vectors.len()
    }

    pub(crate) fn next_scalar_index(&self) -> usize {
        self.scalars.len()
    }

    /// Pushes a node, records the basis ordering and registers the node's tags.
    pub(crate) fn add_vector(&mut self, node: VectorNode) -> PepResult<Vector> {
        let handle = Vector {
            ctx: self.uid,
            index: self.vectors.len(),
        };
        let tags = node.tags.clone();
        if node.is_basis {
            self.basis_vectors.push(handle);
        }
        self.vectors.push(node);
        for tag in tags {
            self.add_tag_to_vectors_or_scalars(&tag, Element::Vector(handle))?;
        }
        Ok(handle)
    }

    pub(crate) fn add_scalar(&mut self, node: ScalarNode) -> PepResult<Scalar> {
        let handle = Scalar {
            ctx: self.uid,
            index: self.scalars.len(),
        };
        let tags = node.tags.clone();
        if node.is_basis {
            self.basis_scalars.push(handle);
        }
        self.scalars.push(node);
        for tag in tags {
            self.add_tag_to_vectors_or_scalars(&tag, Element::Scalar(handle))?;
        }
        Ok(handle)
    }

    fn check_owner(&self, ctx: u64, what: &str) -> PepResult<()> {
        if ctx == self.uid {
            Ok(())
        } else {
            Err(PepError::MissingContext(format!(
                "{} does not belong to the context {} (or the context was cleared)",
                what, self.name
            )))
        }
    }

    pub fn vector_node(&self, v: Vector) -> PepResult<&VectorNode> {
        self.check_owner(v.ctx, "Vector")?;
        self.vectors
            .get(v.index)
            .ok_or_else(|| PepError::MissingContext(format!("no Vector #{} in {}", v.index, self.name)))
    }

    pub(crate) fn vector_node_mut(&mut self, v: Vector) -> PepResult<&mut VectorNode> {
        self.check_owner(v.ctx, "Vector")?;
        let name = self.name.clone();
        self.vectors
            .get_mut(v.index)
            .ok_or_else(|| PepError::MissingContext(format!("no Vector #{} in {}", v.index, name)))
    }

    pub fn scalar_node(&self, s: Scalar) -> PepResult<&ScalarNode> {
        self.check_owner(s.ctx, "Scalar")?;
        self.scalars
            .get(s.index)
            .ok_or_else(|| PepError::MissingContext(format!("no Scalar #{} in {}", s.index, self.name)))
    }

    pub(crate) fn scalar_node_mut(&mut self, s: Scalar) -> PepResult<&mut ScalarNode> {
        self.check_owner(s.ctx, "Scalar")?;
        let name = self.name.clone();
        self.scalars
            .get_mut(s.index)
            .ok_or_else(|| PepError::MissingContext(format!("no Scalar #{} in {}", s.index, name)))
    }

    pub fn num_vectors(&self) -> usize {
        self.vectors.len()
    }

    pub fn num_scalars(&self) -> usize {
        self.scalars.len()
    }

    ///////////////////////////////// TAGS //////////////////////////////////////

    /// Registers `tag` for the element. A tag moved to another element is re-pointed.
    pub fn add_tag_to_vectors_or_scalars(&mut self, tag: &str, element: Element) -> PepResult<()> {
        match element {
            Element::Vector(v) => self.check_owner(v.ctx, "Vector")?,
            Element::Scalar(s) => self.check_owner(s.ctx, "Scalar")?,
        }
        if let Some(previous) = self.tag_index.insert(tag.to_string(), element) {
            if previous != element {
                warn!(
                    "tag {} re-registered in context {}: {} -> {}",
                    tag, self.name, previous, element
                );
            }
        }
        Ok(())
    }

    pub fn get_by_tag(&self, tag: &str) -> PepResult<Element> {
        self.tag_index
            .get(tag)
            .copied()
            .ok_or_else(|| PepError::Tag(format!("Cannot find the tag {} in context {}", tag, self.name)))
    }

    pub fn get_vector_by_tag(&self, tag: &str) -> PepResult<Vector> {
        match self.get_by_tag(tag)? {
            Element::Vector(v) => Ok(v),
            Element::Scalar(_) => Err(PepError::Tag(format!("the tag {} names a Scalar", tag))),
        }
    }

    pub fn get_scalar_by_tag(&self, tag: &str) -> PepResult<Scalar> {
        match self.get_by_tag(tag)? {
            Element::Scalar(s) => Ok(s),
            Element::Vector(_) => Err(PepError::Tag(format!("the tag {} names a Vector", tag))),
        }
    }

    ///////////////////////////////// BASIS /////////////////////////////////////

    pub fn basis_vectors(&self) -> &[Vector] {
        &self.basis_vectors
    }

    pub fn basis_scalars(&self) -> &[Scalar] {
        &self.basis_scalars
    }

    pub fn num_basis_vectors(&self) -> usize {
        self.basis_vectors.len()
    }

    pub fn num_basis_scalars(&self) -> usize {
        self.basis_scalars.len()
    }

    /// Drops every node and tag. Handles issued before are rejected afterwards.
    pub fn clear(&mut self) {
        self.vectors.clear();
        self.scalars.clear();
        self.tag_index.clear();
        self.basis_vectors.clear();
        self.basis_scalars.clear();
        self.uid = next_uid();
        debug!("cleared PEP context {} (new uid {})", self.name, self.uid);
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                CONTEXT REGISTRY
////////////////////////////////////////////////////////////////////////////////////////

/// Named contexts plus the name of the current one.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    contexts: HashMap<String, PepContext>,
    current: Option<String>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the context, replacing one with the same name.
    pub fn create(&mut self, name: &str) -> &mut PepContext {
        let ctx = PepContext::new(name);
        match self.contexts.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(ctx);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(ctx),
        }
    }

    pub fn set_current(&mut self, name: Option<&str>) -> PepResult<()> {
        match name {
            Some(name) if !self.contexts.contains_key(name) => Err(PepError::MissingContext(
                format!("no context named {}", name),
            )),
            Some(name) => {
                self.current = Some(name.to_string());
                Ok(())
            }
            None => {
                self.current = None;
                Ok(())
            }
        }
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> PepResult<&PepContext> {
        self.current
            .as_ref()
            .and_then(|name| self.contexts.get(name))
            .ok_or_else(|| PepError::MissingContext("Did you forget to create a context?".to_string()))
    }

    pub fn current_mut(&mut self) -> PepResult<&mut PepContext> {
        match self.current.as_ref() {
            Some(name) => self.contexts.get_mut(name),
            None => None,
        }
        .ok_or_else(|| PepError::MissingContext("Did you forget to create a context?".to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&PepContext> {
        self.contexts.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PepContext> {
        self.contexts.get_mut(name)
    }

    /// Removing the current context leaves no context current.
    pub fn remove(&mut self, name: &str) -> Option<PepContext> {
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        self.contexts.remove(name)
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
