//! Uploads through to priced quotes.

#![allow(clippy::unwrap_used)]

use mesh_slice::{SliceSettings, SlicerConfig};
use mesh_types::{Point3, TriangleMesh};
use print_quote::{PipelineConfig, PipelineError, QuotePipeline};
use quote_pricing::{
    DeliveryLocation, DiscountSource, Money, PricingError, PricingSettings, QuoteRequest,
};
use rust_decimal_macros::dec;

fn pricing() -> PricingSettings {
    PricingSettings::default()
        .with_hourly_rate(Money::new(dec!(50)))
        .with_setup_fee(Money::new(dec!(10)))
        .with_minimum_price(Money::new(dec!(20)))
        .with_material("pla", Money::new(dec!(0.5)))
}

fn offline_pipeline() -> QuotePipeline {
    QuotePipeline::new(
        PipelineConfig::default()
            .with_pricing(pricing())
            .with_slicer(SlicerConfig::new("/nonexistent/prusa-slicer")),
    )
}

/// A T standing on its stem, so the bar overhangs.
fn tee() -> TriangleMesh {
    let mut mesh =
        TriangleMesh::axis_aligned_box(Point3::new(8.0, 0.0, 0.0), Point3::new(12.0, 16.0, 4.0));
    let bar =
        TriangleMesh::axis_aligned_box(Point3::new(0.0, 16.0, 0.0), Point3::new(20.0, 20.0, 4.0));
    mesh.facets.extend(bar.facets);
    mesh
}

#[test]
fn fallback_estimate_still_prices() {
    let pipeline = offline_pipeline();
    let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(20.0, 20.0, 20.0));
    let bytes = mesh_io::save_stl_binary(&cube);

    let assessment = pipeline
        .assess_upload("cube", &bytes, "cube.stl", &SliceSettings::default())
        .unwrap();
    assert!(assessment.metrics.fallback);

    let request = QuoteRequest {
        items: vec![assessment.to_item("pla", None, 1)],
        ..Default::default()
    };
    let quote = pipeline.quote(&request).unwrap();

    // Fallback 80 g and one hour: 10 + 40 + 50.
    assert_eq!(quote.total, Money::new(dec!(100)));
    assert!(quote.lines[0].estimated);
}

#[test]
fn threemf_upload_is_assessed() {
    let pipeline = offline_pipeline();
    let bytes = mesh_io::save_3mf(&tee()).unwrap();

    let assessment = pipeline
        .assess_upload("tee", &bytes, "tee.3mf", &SliceSettings::default())
        .unwrap();
    assert_eq!(assessment.facet_count, 24);
    assert!(!assessment.overhangs.is_support_free());
    assert!(assessment.settings.supports_enabled);
}

#[test]
fn auto_orientation_lays_the_tee_flat() {
    let pipeline = QuotePipeline::new(
        PipelineConfig::default()
            .with_slicer(SlicerConfig::new("/nonexistent/prusa-slicer"))
            .with_auto_orient(true),
    );
    let assessment = pipeline
        .assess("tee", &tee(), None, &SliceSettings::default())
        .unwrap();
    assert!(assessment.overhangs.is_support_free());
    assert!(!assessment.settings.supports_enabled);
    assert!(assessment.support_grams().abs() < f64::EPSILON);
}

#[test]
fn garbage_upload_is_rejected() {
    let pipeline = offline_pipeline();
    let err = pipeline
        .assess_upload("junk", b"not a mesh at all", "junk.stl", &SliceSettings::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Load(_)));
}

#[test]
fn empty_order_is_rejected() {
    let err = offline_pipeline()
        .quote(&QuoteRequest::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Pricing(PricingError::NoItems)));
}

#[test]
fn student_gets_discount_through_pipeline() {
    let pipeline = offline_pipeline();
    let assessment = pipeline
        .assess("tee", &tee(), None, &SliceSettings::default())
        .unwrap();
    let request = QuoteRequest {
        items: vec![assessment.to_item("pla", None, 1)],
        requester_email: Some("sam@mech.uni.edu".into()),
        location: DeliveryLocation::default(),
        discount: None,
    };
    let quote = pipeline.quote(&request).unwrap();
    assert_eq!(quote.discount_source, DiscountSource::Student);
    assert!(quote.total < quote.subtotal);
}

/// Pipeline whose slicer reports 30 g and two hours for any model.
#[cfg(unix)]
fn scripted_pipeline(dir: &std::path::Path) -> QuotePipeline {
    let script = dir.join("slicer.sh");
    std::fs::write(
        &script,
        r#"
out=""
while [ $# -gt 0 ]; do
    case "$1" in
        --output) out="$2"; shift 2 ;;
        *) shift ;;
    esac
done
printf '; filament used [g] = 30\n; estimated printing time (normal mode) = 2h 0m 0s\n' > "$out"
"#,
    )
    .unwrap();

    let slicer = SlicerConfig::new("/bin/sh")
        .with_arg(script.display().to_string())
        .with_toolpath_dir(dir.join("toolpaths"));
    QuotePipeline::new(
        PipelineConfig::default()
            .with_pricing(pricing())
            .with_slicer(slicer),
    )
}

#[cfg(unix)]
#[test]
fn slicer_output_flows_into_the_quote() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = scripted_pipeline(dir.path());

    let cube = TriangleMesh::axis_aligned_box(Point3::origin(), Point3::new(20.0, 20.0, 20.0));
    let assessment = pipeline
        .assess("cube", &cube, None, &SliceSettings::default())
        .unwrap();
    assert!(!assessment.metrics.fallback);
    assert!(assessment.metrics.toolpath.as_ref().unwrap().exists());

    let request = QuoteRequest {
        items: vec![assessment.to_item("pla", None, 1)],
        ..Default::default()
    };
    let quote = pipeline.quote(&request).unwrap();
    // 10 + 30 × 0.5 + 2 × 50.
    assert_eq!(quote.lines[0].unit_price, Money::new(dec!(125)));
}

#[cfg(unix)]
#[test]
fn sliced_supports_are_billed_once() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = scripted_pipeline(dir.path());

    let assessment = pipeline
        .assess("tee", &tee(), None, &SliceSettings::default())
        .unwrap();
    assert!(!assessment.metrics.fallback);
    assert!(assessment.settings.supports_enabled);
    assert!(assessment.overhangs.support_weight > 0.0);

    let request = QuoteRequest {
        items: vec![assessment.to_item("pla", None, 1)],
        ..Default::default()
    };
    let quote = pipeline.quote(&request).unwrap();
    assert!(quote.lines[0].support_grams.abs() < f64::EPSILON);
    // The slicer's 30 g already includes supports: 10 + 15 + 100.
    assert_eq!(quote.lines[0].unit_price, Money::new(dec!(125)));
}
