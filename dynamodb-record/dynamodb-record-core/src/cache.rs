/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::TagNames;
use crate::descriptor::RecordDescriptor;
use crate::error::Error;
use crate::record::Record;

/// Compiled record descriptors keyed by record type.
///
/// Entries are added on first use and live as long as the cache; nothing is evicted. Lookup,
/// compilation and insertion happen under one lock, so concurrent first use of a type
/// compiles it exactly once. Compilation failures are not stored and are reported again on
/// the next use.
#[derive(Debug, Default)]
pub(crate) struct DescriptorCache {
    entries: Mutex<HashMap<TypeId, Arc<RecordDescriptor>>>,
}

impl DescriptorCache {
    pub(crate) fn get_or_compile<R: Record>(
        &self,
        tags: &TagNames,
    ) -> Result<Arc<RecordDescriptor>, Error> {
        let mut entries = self.lock();
        if let Some(descriptor) = entries.get(&TypeId::of::<R>()) {
            tracing::trace!(record = R::type_name(), "using cached record descriptor");
            return Ok(descriptor.clone());
        }
        let descriptor = Arc::new(RecordDescriptor::compile(
            R::type_name(),
            &R::fields(),
            tags,
        )?);
        tracing::debug!(
            record = R::type_name(),
            fields = descriptor.fields().len(),
            "compiled record descriptor"
        );
        entries.insert(TypeId::of::<R>(), descriptor.clone());
        Ok(descriptor)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Arc<RecordDescriptor>>> {
        // Entries are only inserted once fully compiled, so a poisoned map is still consistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
