//! Read-only collaborators the scaffolder queries for contigs, reads,
//! templates and read placements. Failures are reported as
//! `anyhow::Error` and passed through to the caller untouched.

use std::cell::RefCell;

use anyhow::{bail, Result};
use fnv::FnvHashMap;

use crate::contig::*;

pub trait ContigRepository {
    /// Fetch a contig by ID, current or not
    fn contig(&self, id: ContigId) -> Result<Option<Contig>>;

    /// Whether the contig belongs to the current assembly
    fn is_current(&self, id: ContigId) -> Result<bool>;

    /// IDs of all contigs in the current assembly, in ascending order
    fn current_contigs(&self) -> Result<Vec<ContigId>>;
}

pub trait EndReadRepository {
    /// Reads on the contig inside the window with the given
    /// orientation
    fn end_reads(
        &self,
        contig: ContigId,
        window: ReadWindow,
        orientation: Orientation,
    ) -> Result<Vec<EndRead>>;
}

pub trait TemplateRepository {
    /// The template a read was sequenced from, and the read's strand
    fn read_template(&self, read: ReadId) -> Result<Option<(TemplateId, Strand)>>;

    fn insert_size(&self, template: TemplateId) -> Result<Option<InsertSize>>;
}

pub trait MateRepository {
    /// Reads on the template whose strand differs from `exclude`
    fn mates(&self, template: TemplateId, exclude: Strand) -> Result<Vec<ReadId>>;
}

pub trait MappingRepository {
    /// Placements of the read on contigs of the current assembly
    fn current_mappings(&self, read: ReadId) -> Result<Vec<ContigMapping>>;
}

/// Everything the scaffolder needs from the outside world
pub trait Repository:
    ContigRepository
    + EndReadRepository
    + TemplateRepository
    + MateRepository
    + MappingRepository
{
}

impl<T> Repository for T where
    T: ContigRepository
        + EndReadRepository
        + TemplateRepository
        + MateRepository
        + MappingRepository
{
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContigEntry {
    contig: Contig,
    current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReadEntry {
    template: TemplateId,
    strand: Strand,
}

/// Repository held entirely in memory
#[derive(Default, Debug, Clone)]
pub struct MemoryRepository {
    contigs: FnvHashMap<ContigId, ContigEntry>,
    templates: FnvHashMap<TemplateId, InsertSize>,
    reads: FnvHashMap<ReadId, ReadEntry>,
    template_reads: FnvHashMap<TemplateId, Vec<ReadId>>,
    read_mappings: FnvHashMap<ReadId, Vec<ContigMapping>>,
    contig_reads: FnvHashMap<ContigId, Vec<EndRead>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_contig(&mut self, id: ContigId, length: i64, current: bool) -> Result<Contig> {
        let contig = match Contig::new(id, length) {
            Some(c) => c,
            None => bail!("Contig {} has non-positive length {}", id, length),
        };
        self.contigs.insert(id, ContigEntry { contig, current });
        Ok(contig)
    }

    pub fn add_template(&mut self, id: TemplateId, low: i64, high: i64) -> Result<InsertSize> {
        let size = match InsertSize::new(low, high) {
            Some(s) => s,
            None => bail!("Template {} has invalid insert size range [{}, {}]", id, low, high),
        };
        self.templates.insert(id, size);
        Ok(size)
    }

    /// Register a read on a template. Re-adding a read moves it to the
    /// new template.
    pub fn add_read(&mut self, read: ReadId, template: TemplateId, strand: Strand) {
        if let Some(old) = self.reads.insert(read, ReadEntry { template, strand }) {
            if let Some(reads) = self.template_reads.get_mut(&old.template) {
                reads.retain(|&r| r != read);
            }
        }
        self.template_reads.entry(template).or_default().push(read);
    }

    pub fn add_mapping(&mut self, read: ReadId, mapping: ContigMapping) {
        self.read_mappings.entry(read).or_default().push(mapping);
        self.contig_reads
            .entry(mapping.contig)
            .or_default()
            .push(mapping.as_end_read(read));
    }

    pub fn contig_count(&self) -> usize {
        self.contigs.len()
    }

    pub fn read_count(&self) -> usize {
        self.reads.len()
    }

    fn current_entry(&self, id: ContigId) -> Option<&ContigEntry> {
        self.contigs.get(&id).filter(|e| e.current)
    }
}

impl ContigRepository for MemoryRepository {
    fn contig(&self, id: ContigId) -> Result<Option<Contig>> {
        Ok(self.contigs.get(&id).map(|e| e.contig))
    }

    fn is_current(&self, id: ContigId) -> Result<bool> {
        Ok(self.current_entry(id).is_some())
    }

    fn current_contigs(&self) -> Result<Vec<ContigId>> {
        let mut ids: Vec<_> = self
            .contigs
            .values()
            .filter(|e| e.current)
            .map(|e| e.contig.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

impl EndReadRepository for MemoryRepository {
    fn end_reads(
        &self,
        contig: ContigId,
        window: ReadWindow,
        orientation: Orientation,
    ) -> Result<Vec<EndRead>> {
        let reads = match self.contig_reads.get(&contig) {
            Some(reads) => reads,
            None => return Ok(Vec::new()),
        };
        Ok(reads
            .iter()
            .filter(|r| r.orientation == orientation)
            .filter(|r| window.contains(r.start, r.finish))
            .copied()
            .collect())
    }
}

impl TemplateRepository for MemoryRepository {
    fn read_template(&self, read: ReadId) -> Result<Option<(TemplateId, Strand)>> {
        Ok(self.reads.get(&read).map(|e| (e.template, e.strand)))
    }

    fn insert_size(&self, template: TemplateId) -> Result<Option<InsertSize>> {
        Ok(self.templates.get(&template).copied())
    }
}

impl MateRepository for MemoryRepository {
    fn mates(&self, template: TemplateId, exclude: Strand) -> Result<Vec<ReadId>> {
        let reads = match self.template_reads.get(&template) {
            Some(reads) => reads,
            None => return Ok(Vec::new()),
        };
        Ok(reads
            .iter()
            .copied()
            .filter(|r| {
                self.reads
                    .get(r)
                    .map_or(false, |e| e.strand != exclude)
            })
            .collect())
    }
}

impl MappingRepository for MemoryRepository {
    fn current_mappings(&self, read: ReadId) -> Result<Vec<ContigMapping>> {
        let mappings = match self.read_mappings.get(&read) {
            Some(m) => m,
            None => return Ok(Vec::new()),
        };
        Ok(mappings
            .iter()
            .filter(|m| self.current_entry(m.contig).is_some())
            .copied()
            .collect())
    }
}

/// Wraps another repository and memoizes the lookups the evidence
/// collector repeats for every end read: contig records, currency
/// flags and template insert sizes. Meant to live for a single run.
pub struct CachedRepository<R> {
    inner: R,
    contigs: RefCell<FnvHashMap<ContigId, Option<Contig>>>,
    current: RefCell<FnvHashMap<ContigId, bool>>,
    insert_sizes: RefCell<FnvHashMap<TemplateId, Option<InsertSize>>>,
}

impl<R> CachedRepository<R> {
    pub fn new(inner: R) -> Self {
        CachedRepository {
            inner,
            contigs: Default::default(),
            current: Default::default(),
            insert_sizes: Default::default(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Drop all memoized lookups
    pub fn clear(&self) {
        self.contigs.borrow_mut().clear();
        self.current.borrow_mut().clear();
        self.insert_sizes.borrow_mut().clear();
    }
}

impl<R: ContigRepository> ContigRepository for CachedRepository<R> {
    fn contig(&self, id: ContigId) -> Result<Option<Contig>> {
        if let Some(c) = self.contigs.borrow().get(&id) {
            return Ok(*c);
        }
        let contig = self.inner.contig(id)?;
        self.contigs.borrow_mut().insert(id, contig);
        Ok(contig)
    }

    fn is_current(&self, id: ContigId) -> Result<bool> {
        if let Some(c) = self.current.borrow().get(&id) {
            return Ok(*c);
        }
        let current = self.inner.is_current(id)?;
        self.current.borrow_mut().insert(id, current);
        Ok(current)
    }

    fn current_contigs(&self) -> Result<Vec<ContigId>> {
        self.inner.current_contigs()
    }
}

impl<R: EndReadRepository> EndReadRepository for CachedRepository<R> {
    fn end_reads(
        &self,
        contig: ContigId,
        window: ReadWindow,
        orientation: Orientation,
    ) -> Result<Vec<EndRead>> {
        self.inner.end_reads(contig, window, orientation)
    }
}

impl<R: TemplateRepository> TemplateRepository for CachedRepository<R> {
    fn read_template(&self, read: ReadId) -> Result<Option<(TemplateId, Strand)>> {
        self.inner.read_template(read)
    }

    fn insert_size(&self, template: TemplateId) -> Result<Option<InsertSize>> {
        if let Some(s) = self.insert_sizes.borrow().get(&template) {
            return Ok(*s);
        }
        let size = self.inner.insert_size(template)?;
        self.insert_sizes.borrow_mut().insert(template, size);
        Ok(size)
    }
}

impl<R: MateRepository> MateRepository for CachedRepository<R> {
    fn mates(&self, template: TemplateId, exclude: Strand) -> Result<Vec<ReadId>> {
        self.inner.mates(template, exclude)
    }
}

impl<R: MappingRepository> MappingRepository for CachedRepository<R> {
    fn current_mappings(&self, read: ReadId) -> Result<Vec<ContigMapping>> {
        self.inner.current_mappings(read)
    }
}
