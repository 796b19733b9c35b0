//! Pass registry
//!
//! Holds every pass descriptor in registration order. The order is part of
//! the contract: `--help` lists pass flags in it and the orchestrator uses
//! it to break ties between independent passes.

use crate::error::RegistryError;
use crate::pass::{Pass, PassDescriptor, PassId};
use casmi_config::RunConfig;

#[derive(Default)]
pub struct PassRegistry {
    passes: Vec<PassDescriptor>,
}

impl std::fmt::Debug for PassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassRegistry")
            .field("count", &self.passes.len())
            .finish()
    }
}

impl PassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pass. A second descriptor with an identity or flag that is
    /// already taken is rejected and the first registration stays.
    pub fn register(&mut self, descriptor: PassDescriptor) -> Result<(), RegistryError> {
        if self.contains(descriptor.id) {
            return Err(RegistryError::Duplicate { pass: descriptor.id });
        }

        for existing in &self.passes {
            let taken = match (descriptor.short, existing.short) {
                (Some(a), Some(b)) if a == b => Some(format!("-{a}")),
                _ => None,
            }
            .or_else(|| match (descriptor.long, existing.long) {
                (Some(a), Some(b)) if a == b => Some(format!("--{a}")),
                _ => None,
            });
            if let Some(flag) = taken {
                return Err(RegistryError::FlagTaken {
                    flag,
                    pass: descriptor.id,
                    owner: existing.id,
                });
            }
        }

        self.passes.push(descriptor);
        Ok(())
    }

    /// All descriptors in registration order
    pub fn all(&self) -> impl Iterator<Item = &PassDescriptor> {
        self.passes.iter()
    }

    pub fn lookup(&self, id: PassId) -> Result<&PassDescriptor, RegistryError> {
        self.passes
            .iter()
            .find(|descriptor| descriptor.id == id)
            .ok_or_else(|| RegistryError::NotFound {
                pass: id.to_string(),
            })
    }

    pub fn contains(&self, id: PassId) -> bool {
        self.passes.iter().any(|descriptor| descriptor.id == id)
    }

    /// Build a fresh instance through the descriptor's factory
    pub fn instantiate(&self, id: PassId, config: &RunConfig) -> Result<Box<dyn Pass>, RegistryError> {
        let descriptor = self.lookup(id)?;
        Ok((descriptor.factory)(config))
    }

    /// Position in registration order
    pub fn position(&self, id: PassId) -> Option<usize> {
        self.passes.iter().position(|descriptor| descriptor.id == id)
    }

    /// Check that every declared input is registered.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for descriptor in &self.passes {
            for &input in &descriptor.requires {
                if !self.contains(input) {
                    return Err(RegistryError::DanglingInput {
                        pass: descriptor.id,
                        input,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}
