//! Destinations for canonical records

use crate::artifacts::{self, CanonicalRecord, FieldSpec, FieldValue};
use crate::config::ArtifactKind;
use crate::error::{ForensicsError, Result};
use crate::extractor::RunSummary;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

/// Receives one extraction run: a field table, records, then a summary
pub trait RecordSink {
    fn declare(&mut self, kind: ArtifactKind, fields: &[FieldSpec]) -> Result<()>;
    fn emit(&mut self, record: &CanonicalRecord) -> Result<()>;
    /// Write the run summary and flush.
    fn finish(&mut self, summary: &RunSummary) -> Result<()>;
}

/// Values keyed by field name, in declaration order
struct OrderedValues<'a> {
    fields: &'a [FieldSpec],
    values: &'a [FieldValue],
}

impl Serialize for OrderedValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in self.fields.iter().zip(self.values) {
            map.serialize_entry(field.name, value)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Line<'a> {
    Header {
        module: &'a str,
        fields: &'a [FieldSpec],
    },
    Record {
        module: &'a str,
        values: OrderedValues<'a>,
    },
    Summary(&'a RunSummary),
}

/// Writes one JSON object per line
///
/// Each run produces a `header` line with the field table, one `record`
/// line per record and a closing `summary` line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    declared: Option<ArtifactKind>,
}

impl JsonLinesSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            ForensicsError::Sink(format!("Failed to create output file {:?}: {}", path, e))
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            declared: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &Line<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, line)
            .map_err(|e| ForensicsError::Sink(format!("Failed to encode record: {}", e)))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| ForensicsError::Sink(format!("Failed to write record: {}", e)))
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn declare(&mut self, kind: ArtifactKind, fields: &[FieldSpec]) -> Result<()> {
        self.declared = Some(kind);
        self.write_line(&Line::Header {
            module: kind.id(),
            fields,
        })
    }

    fn emit(&mut self, record: &CanonicalRecord) -> Result<()> {
        let kind = record.kind();
        if self.declared != Some(kind) {
            return Err(ForensicsError::Sink(format!(
                "{} record emitted before its field table was declared",
                kind
            )));
        }
        let values = record.values();
        self.write_line(&Line::Record {
            module: kind.id(),
            values: OrderedValues {
                fields: artifacts::fields(kind),
                values: &values,
            },
        })
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<()> {
        self.write_line(&Line::Summary(summary))?;
        self.declared = None;
        self.writer
            .flush()
            .map_err(|e| ForensicsError::Sink(format!("Failed to flush output: {}", e)))
    }
}

/// Keeps everything in memory; used by tests and library callers
#[derive(Debug, Default)]
pub struct MemorySink {
    pub declared: Vec<(ArtifactKind, Vec<FieldSpec>)>,
    pub records: Vec<CanonicalRecord>,
    pub summaries: Vec<RunSummary>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for MemorySink {
    fn declare(&mut self, kind: ArtifactKind, fields: &[FieldSpec]) -> Result<()> {
        self.declared.push((kind, fields.to_vec()));
        Ok(())
    }

    fn emit(&mut self, record: &CanonicalRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<()> {
        self.summaries.push(summary.clone());
        Ok(())
    }
}
