//! Output sink: RDF/XML recommendation files
//!
//! Each flush goes to its own file. Destinations are derived from the configured
//! output path by inserting a strictly increasing millisecond stamp before the
//! extension (`out/recommendations.rdf` → `out/recommendations_1700000000000.rdf`).
//! Files are written to a temporary sibling, synced, then renamed into place.

use crate::types::Recommendation;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use semrec_common::time::MonotonicStamp;
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const REC_NS: &str = "http://semagrow.eu/schemas/recommender#";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("RDF/XML serialization failed: {0}")]
    Serialize(String),
}

/// Destination for flushed recommendation batches
pub trait OutputSink {
    fn write(&mut self, recommendations: &[Recommendation], destination: &Path)
        -> Result<(), SinkError>;
}

/// Writes each batch as an RDF/XML document
#[derive(Debug, Default)]
pub struct RdfXmlFileSink;

impl RdfXmlFileSink {
    pub fn new() -> Self {
        Self
    }
}

impl OutputSink for RdfXmlFileSink {
    fn write(
        &mut self,
        recommendations: &[Recommendation],
        destination: &Path,
    ) -> Result<(), SinkError> {
        let document = to_rdf_xml(recommendations)?;
        write_atomically(destination, &document).map_err(|source| SinkError::Io {
            path: destination.to_path_buf(),
            source,
        })
    }
}

/// Serialize recommendations as RDF/XML
pub fn to_rdf_xml(recommendations: &[Recommendation]) -> Result<Vec<u8>, SinkError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(
        &mut writer,
        Event::Start(
            BytesStart::new("rdf:RDF").with_attributes([("xmlns:rdf", RDF_NS), ("xmlns:rec", REC_NS)]),
        ),
    )?;

    for rec in recommendations {
        let weight = rec.weight.to_string();

        emit(&mut writer, Event::Start(BytesStart::new("rec:Recommendation")))?;
        emit(
            &mut writer,
            Event::Empty(
                BytesStart::new("rec:source").with_attributes([("rdf:resource", rec.source.as_str())]),
            ),
        )?;
        emit(
            &mut writer,
            Event::Empty(
                BytesStart::new("rec:target").with_attributes([("rdf:resource", rec.target.as_str())]),
            ),
        )?;
        emit(
            &mut writer,
            Event::Start(BytesStart::new("rec:weight").with_attributes([("rdf:datatype", XSD_INTEGER)])),
        )?;
        emit(&mut writer, Event::Text(BytesText::new(&weight)))?;
        emit(&mut writer, Event::End(BytesEnd::new("rec:weight")))?;
        emit(&mut writer, Event::End(BytesEnd::new("rec:Recommendation")))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("rdf:RDF")))?;

    let mut document = writer.into_inner();
    document.push(b'\n');
    Ok(document)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SinkError> {
    writer
        .write_event(event)
        .map_err(|e| SinkError::Serialize(e.to_string()))
}

fn write_atomically(destination: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = OsString::from(destination.as_os_str());
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, destination)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

/// Hands out a fresh destination path per flush
#[derive(Debug)]
pub struct DestinationNamer {
    base: PathBuf,
    stamp: MonotonicStamp,
}

impl DestinationNamer {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            stamp: MonotonicStamp::new(),
        }
    }

    pub fn next_destination(&mut self) -> PathBuf {
        destination_for(&self.base, self.stamp.next())
    }
}

/// `base` with `_<stamp>` inserted before its extension
pub fn destination_for(base: &Path, stamp: i64) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recommendations".to_string());

    let file_name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, stamp),
    };

    base.with_file_name(file_name)
}

/// Create the output directory if needed and check that it is writable
///
/// Run once before any identifier is processed.
pub fn ensure_output_location(output_path: &Path) -> std::io::Result<()> {
    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    std::fs::create_dir_all(&parent)?;

    let probe = parent.join(format!(".semrec-write-probe-{}", std::process::id()));
    File::create(&probe)?;
    std::fs::remove_file(&probe)
}
