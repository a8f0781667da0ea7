//! Report emission.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::{self, Write};

use txnstats_types::Report;

/// Write `report` as tab-indented JSON followed by a newline.
pub fn write_report<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    let mut serializer = Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(b"\t"));
    report.serialize(&mut serializer).map_err(io::Error::from)?;
    out.write_all(b"\n")?;
    out.flush()
}
