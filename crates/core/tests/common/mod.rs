//! In-memory PDF builder shared by the integration tests.

#![allow(dead_code)]

use std::fmt::Write as _;

/// Location of one written object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    pub id: u64,
    pub offset: u64,
    /// Start of the stream payload, for stream objects.
    pub stream_offset: Option<u64>,
}

/// Builds small PDFs with exact, known offsets.
///
/// Objects are appended with [`object`](Self::object) or
/// [`stream_object`](Self::stream_object); each call to
/// [`finish_revision`](Self::finish_revision) closes a revision with a
/// classic xref table listing the objects written since the last one.
pub struct PdfBuilder {
    buf: Vec<u8>,
    pending: Vec<Written>,
    prev_xref: Option<u64>,
    max_id: u64,
}

impl PdfBuilder {
    pub fn new(version: &str) -> Self {
        let mut buf = format!("%PDF-{version}\n").into_bytes();
        buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            pending: Vec::new(),
            prev_xref: None,
            max_id: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Writes `id 0 obj\n<body>\nendobj\n`.
    pub fn object(&mut self, id: u64, body: &str) -> Written {
        let offset = self.len();
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
        self.track(Written {
            id,
            offset,
            stream_offset: None,
        })
    }

    /// Writes a stream object whose dictionary holds `dict` plus `/Length`.
    pub fn stream_object(&mut self, id: u64, dict: &str, data: &[u8]) -> Written {
        self.stream_object_with_length(id, dict, &data.len().to_string(), data)
    }

    /// Like [`stream_object`](Self::stream_object) with a raw `/Length` value.
    pub fn stream_object_with_length(
        &mut self,
        id: u64,
        dict: &str,
        length: &str,
        data: &[u8],
    ) -> Written {
        let offset = self.len();
        self.buf.extend_from_slice(
            format!("{id} 0 obj\n<< {dict} /Length {length} >>\nstream\n").as_bytes(),
        );
        let stream_offset = self.len();
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        self.track(Written {
            id,
            offset,
            stream_offset: Some(stream_offset),
        })
    }

    fn track(&mut self, written: Written) -> Written {
        self.max_id = self.max_id.max(written.id);
        self.pending.push(written);
        written
    }

    /// Writes the xref table, trailer and footer for the pending objects.
    /// Returns the offset of the `xref` keyword.
    pub fn finish_revision(&mut self) -> u64 {
        let xref = self.len();
        let mut table = String::from("xref\n");
        if self.prev_xref.is_none() {
            table.push_str("0 1\n0000000000 65535 f \n");
        }
        for w in &self.pending {
            let _ = write!(table, "{} 1\n{:010} 00000 n \n", w.id, w.offset);
        }
        let _ = write!(table, "trailer\n<< /Size {} /Root 1 0 R", self.max_id + 1);
        if let Some(prev) = self.prev_xref {
            let _ = write!(table, " /Prev {prev}");
        }
        let _ = write!(table, " >>\nstartxref\n{xref}\n%%EOF\n");
        self.buf.extend_from_slice(table.as_bytes());
        self.pending.clear();
        self.prev_xref = Some(xref);
        xref
    }

    /// Closes the revision with an xref-stream object instead of a table.
    /// The stream payload is opaque filler; it is never decoded.
    pub fn finish_with_xref_stream(&mut self, id: u64) -> u64 {
        let written = self.stream_object(id, "/Type /XRef /W [1 4 2]", b"\x01\x00\x00\x00\x0f\x00\x00");
        self.pending.clear();
        let footer = format!("startxref\n{}\n%%EOF\n", written.offset);
        self.buf.extend_from_slice(footer.as_bytes());
        self.prev_xref = Some(written.offset);
        written.offset
    }

    pub fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

/// A one-page document with a catalog, page tree, page and content stream.
pub fn simple_document() -> (Vec<u8>, Vec<Written>) {
    let mut b = PdfBuilder::new("1.7");
    let objects = vec![
        b.object(1, "<< /Type /Catalog /Pages 2 0 R >>"),
        b.object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>"),
        b.object(
            3,
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R >>",
        ),
        b.stream_object(4, "", b"BT /F1 12 Tf (Hello) Tj ET"),
    ];
    b.finish_revision();
    (b.build(), objects)
}
