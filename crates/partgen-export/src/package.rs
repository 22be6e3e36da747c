//! Writing generated files to disk, one by one or as an installable bundle.

use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use tracing::info;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::FileOptions;

use crate::error::ExportError;
use crate::views::ViewKind;
use crate::xml::XmlElement;

pub const DESCRIPTOR_SUFFIX: &str = ".fzp";
pub const BUNDLE_SUFFIX: &str = ".fzpz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    View(ViewKind),
    Descriptor,
}

impl FileKind {
    /// Position inside a bundle.
    const BUNDLE_ORDER: [FileKind; 5] = [
        FileKind::View(ViewKind::Breadboard),
        FileKind::View(ViewKind::Icon),
        FileKind::View(ViewKind::Schematic),
        FileKind::View(ViewKind::Pcb),
        FileKind::Descriptor,
    ];

    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            FileKind::View(view) => view.file_suffix(),
            FileKind::Descriptor => DESCRIPTOR_SUFFIX,
        }
    }

    #[must_use]
    pub fn bundle_prefix(self) -> &'static str {
        match self {
            FileKind::View(view) => view.bundle_prefix(),
            FileKind::Descriptor => "part.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub kind: FileKind,
    pub file_name: String,
    pub contents: String,
}

/// Every generated file of one part, serialized and ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartPackage {
    name: String,
    files: Vec<PackageFile>,
}

/// Pretty-printed document with an XML declaration and tab indentation.
pub fn to_pretty_xml(root: &XmlElement) -> Result<String, ExportError> {
    root.to_pretty_string()
}

impl PartPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// Add or replace the file of `kind`.
    pub fn insert(&mut self, kind: FileKind, root: &XmlElement) -> Result<(), ExportError> {
        let file = PackageFile {
            kind,
            file_name: format!("{}{}", self.name, kind.suffix()),
            contents: to_pretty_xml(root)?,
        };
        match self.files.iter_mut().find(|f| f.kind == kind) {
            Some(slot) => *slot = file,
            None => self.files.push(file),
        }
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn file(&self, kind: FileKind) -> Option<&PackageFile> {
        self.files.iter().find(|f| f.kind == kind)
    }

    /// Files in bundle order.
    pub fn files(&self) -> impl Iterator<Item = &PackageFile> + '_ {
        FileKind::BUNDLE_ORDER
            .into_iter()
            .filter_map(move |kind| self.file(kind))
    }

    #[must_use]
    pub fn bundle_file_name(&self) -> String {
        format!("{}{}", self.name, BUNDLE_SUFFIX)
    }

    /// Write every file into `dir`, creating it if needed.
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for file in self.files() {
            let path = dir.join(&file.file_name);
            fs::write(&path, &file.contents)?;
            written.push(path);
        }
        info!(part = %self.name, dir = %dir.display(), files = written.len(), "wrote part files");
        Ok(written)
    }

    /// Write the deflated bundle to `path`.
    pub fn write_bundle(&self, path: &Path) -> Result<(), ExportError> {
        let file = fs::File::create(path)?;
        self.bundle_into(file)?;
        info!(part = %self.name, path = %path.display(), "wrote part bundle");
        Ok(())
    }

    /// Stream the bundle into any seekable writer.
    pub fn bundle_into<W: Write + Seek>(&self, writer: W) -> Result<W, ExportError> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);
        for file in self.files() {
            let entry = format!("{}{}", file.kind.bundle_prefix(), file.file_name);
            zip.start_file(entry, options)?;
            zip.write_all(file.contents.as_bytes())?;
        }
        Ok(zip.finish()?)
    }
}
