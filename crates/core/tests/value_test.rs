//! Typed key-value extraction across a whole document.

mod common;

use chrono::{Datelike, Timelike};
use common::PdfBuilder;
use pdfcarve_core::{PdfFile, ScanContext, TypedValue};

fn document() -> PdfFile {
    let mut b = PdfBuilder::new("1.6");
    b.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    b.object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
    b.object(3, "<< /Type /Page /Parent 2 0 R /Rotate 0 >>");
    b.object(
        4,
        "<< /Producer (Writer 2.1) /Title (Quarterly \\(final\\)) /CreationDate (D:20240229235959-05'30') /ModDate (D:2024) >>",
    );
    b.finish_revision();
    b.object(5, "<< /Producer (Writer 2.1) /ID <DEADBEEF> >>");
    b.object(6, "<< /Producer (Other Tool) >>");
    b.finish_revision();
    PdfFile::new(b.build())
}

#[test]
fn test_distinct_values_in_first_seen_order() {
    let pdf = document();
    let values = pdf.values_by_key("/Producer", &ScanContext::new());
    assert_eq!(
        values,
        [
            TypedValue::String("Writer 2.1".into()),
            TypedValue::String("Other Tool".into()),
        ]
    );
}

#[test]
fn test_key_without_slash() {
    let pdf = document();
    let types = pdf.values_by_key("Type", &ScanContext::new());
    assert_eq!(
        types,
        [
            TypedValue::Raw("/Catalog".into()),
            TypedValue::Raw("/Pages".into()),
            TypedValue::Raw("/Page".into()),
        ]
    );
}

#[test]
fn test_typed_shapes() {
    let pdf = document();
    let ctx = ScanContext::new();

    assert_eq!(pdf.values_by_key("/Count", &ctx), [TypedValue::Int64(1)]);
    assert_eq!(pdf.values_by_key("/Rotate", &ctx), [TypedValue::Raw("0".into())]);
    assert_eq!(
        pdf.values_by_key("/Title", &ctx),
        [TypedValue::String("Quarterly (final)".into())]
    );
    assert_eq!(
        pdf.values_by_key("/ID", &ctx),
        [TypedValue::Hex("DEADBEEF".into())]
    );
    // Too short to be a date.
    assert_eq!(
        pdf.values_by_key("/ModDate", &ctx),
        [TypedValue::String("D:2024".into())]
    );
    assert!(pdf.values_by_key("/Missing", &ctx).is_empty());
}

#[test]
fn test_date_value() {
    let pdf = document();
    let values = pdf.values_by_key("/CreationDate", &ScanContext::new());
    let [TypedValue::DateTime(date)] = values.as_slice() else {
        panic!("expected one date, got {values:?}");
    };
    assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 29));
    assert_eq!((date.hour(), date.minute(), date.second()), (23, 59, 59));
    assert_eq!(date.offset().local_minus_utc(), -(5 * 3600 + 30 * 60));
    assert_eq!(values[0].to_string(), "2024-02-29T23:59:59-05:30");
}
