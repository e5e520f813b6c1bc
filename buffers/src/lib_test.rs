#![allow(clippy::float_cmp)]

use super::*;

fn sample_node(id: i32) -> NodeRecord {
    NodeRecord { id, x: 10.0, y: 20.0, w: 100.0, h: 50.0, vx: 1.5, vy: -2.0, flags: 3 }
}

// =============================================================
// Fixed-stride records
// =============================================================

#[test]
fn node_buffer_decodes_every_record_in_order() {
    let buf = encode(&[sample_node(1), sample_node(2)]);
    assert_eq!(buf.len(), 16);
    let nodes: Vec<NodeRecord> = decode(&buf).expect("decode");
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0], sample_node(1));
    assert_eq!(nodes[1].id, 2);
}

#[test]
fn node_buffer_with_partial_record_is_rejected() {
    let mut buf = encode(&[sample_node(1)]);
    buf.push(1.0);
    let err = decode::<NodeRecord>(&buf).expect_err("stride should fail");
    assert_eq!(err, BufferError::Stride { kind: "node", len: 9, stride: 8 });
}

#[test]
fn empty_buffer_decodes_to_no_records() {
    let nodes: Vec<NodeRecord> = decode(&[]).expect("decode");
    assert!(nodes.is_empty());
}

#[test]
fn node_id_must_be_positive_integer() {
    let mut buf = encode(&[sample_node(1)]);
    buf[0] = 0.0;
    assert!(matches!(decode::<NodeRecord>(&buf), Err(BufferError::InvalidId { kind: "node", .. })));
    buf[0] = 2.5;
    assert!(matches!(decode::<NodeRecord>(&buf), Err(BufferError::InvalidId { .. })));
    buf[0] = f32::NAN;
    assert!(matches!(decode::<NodeRecord>(&buf), Err(BufferError::InvalidId { .. })));
}

#[test]
fn one_bad_record_rejects_whole_buffer() {
    let mut buf = encode(&[sample_node(1), sample_node(2), sample_node(3)]);
    buf[16] = -4.0;
    assert!(decode::<NodeRecord>(&buf).is_err());
}

#[test]
fn decode_one_requires_exact_length() {
    let ok: ConstraintsRecord = decode_one(&[0.0, 0.0, 800.0, 600.0, 1.0, 1.0, 1.0, 0.5]).expect("decode");
    assert_eq!(ok.right, 800.0);
    assert_eq!(ok.damping, 0.5);

    let err = decode_one::<ConstraintsRecord>(&[0.0; 16]).expect_err("two records");
    assert_eq!(err, BufferError::Length { kind: "constraints", len: 16, expected: 8 });
    assert!(decode_one::<TapParamsRecord>(&[0.25, 6.0, 0.3]).is_err());
}

#[test]
fn transform_record_writes_zero_reserved_slot() {
    let t = TransformRecord { id: 7, x: 1.0, y: 2.0, angle: 0.0, sx: 1.0, sy: 1.0 };
    let buf = encode(&[t]);
    assert_eq!(buf, vec![7.0, 1.0, 2.0, 0.0, 1.0, 1.0, 0.0]);
    let back: TransformRecord = decode_one(&buf).expect("decode");
    assert_eq!(back, t);
}

#[test]
fn particle_record_field_order() {
    let p: ParticleRecord = decode_one(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("decode");
    assert_eq!((p.x, p.y, p.vx, p.vy, p.radius, p.life), (1.0, 2.0, 3.0, 4.0, 5.0, 6.0));
}

#[test]
fn particle_params_field_order_is_gravity_x_first() {
    let p: ParticleParamsRecord = decode_one(&[0.0, 900.0, 0.995, 0.6]).expect("decode");
    assert_eq!(p.gravity_x, 0.0);
    assert_eq!(p.gravity_y, 900.0);
    assert_eq!(p.restitution, 0.6);
}

#[test]
fn records_serialize_to_json() {
    let json = serde_json::to_value(sample_node(4)).expect("serialize");
    assert_eq!(json["id"], 4);
    assert_eq!(json["flags"], 3);
}

// =============================================================
// Pointers
// =============================================================

#[test]
fn pointer_layout_detected_from_length() {
    assert_eq!(PointerLayout::detect(8), Ok(PointerLayout::Compact));
    assert_eq!(PointerLayout::detect(15), Ok(PointerLayout::WithPressure));
    assert_eq!(PointerLayout::detect(20), Ok(PointerLayout::Compact));
    assert_eq!(PointerLayout::detect(0), Ok(PointerLayout::Compact));
    assert_eq!(PointerLayout::detect(7), Err(BufferError::InvalidPointerLayout { len: 7 }));
}

#[test]
fn compact_pointers_report_full_pressure() {
    let ptrs = decode_pointers(&[1.0, 10.0, 20.0, 1.0]).expect("decode");
    assert_eq!(ptrs.len(), 1);
    assert_eq!(ptrs[0].pressure, 1.0);
    assert!(ptrs[0].is_pressed());
}

#[test]
fn pressure_pointers_keep_pressure_and_buttons() {
    let ptrs = decode_pointers(&[3.0, 5.0, 6.0, 0.4, 0.0, 4.0, 7.0, 8.0, 0.9, 1.0, 5.0, 1.0, 1.0, 0.5, 2.0])
        .expect("decode");
    assert_eq!(ptrs.len(), 3);
    assert_eq!(ptrs[0].pressure, 0.4);
    assert!(!ptrs[0].is_pressed());
    assert_eq!(ptrs[2].buttons, 2);
}

#[test]
fn explicit_layout_overrides_detection() {
    let with_pressure = vec![
        PointerRecord { id: 1, x: 0.0, y: 0.0, pressure: 0.5, buttons: 1 },
        PointerRecord { id: 2, x: 1.0, y: 1.0, pressure: 0.5, buttons: 1 },
        PointerRecord { id: 3, x: 2.0, y: 2.0, pressure: 0.5, buttons: 1 },
        PointerRecord { id: 4, x: 3.0, y: 3.0, pressure: 0.5, buttons: 1 },
    ];
    let buf = encode_pointers(&with_pressure, PointerLayout::WithPressure);
    assert_eq!(buf.len(), 20);
    let decoded = decode_pointers_with(&buf, PointerLayout::WithPressure).expect("decode");
    assert_eq!(decoded, with_pressure);
}

#[test]
fn explicit_layout_rejects_wrong_stride() {
    let err = decode_pointers_with(&[1.0, 2.0, 3.0, 4.0], PointerLayout::WithPressure).expect_err("stride");
    assert_eq!(err, BufferError::Stride { kind: "pointer", len: 4, stride: 5 });
}

#[test]
fn pointer_id_zero_is_allowed() {
    let ptrs = decode_pointers(&[0.0, 1.0, 1.0, 1.0]).expect("decode");
    assert_eq!(ptrs[0].id, 0);
    assert!(decode_pointers(&[-1.0, 1.0, 1.0, 1.0]).is_err());
}

// =============================================================
// Events
// =============================================================

#[test]
fn event_kind_numeric_mapping_matches_wire() {
    assert_eq!(EventKind::DragStart.as_i32(), 1);
    assert_eq!(EventKind::DragEnd.as_i32(), 2);
    assert_eq!(EventKind::Tap.as_i32(), 10);
    assert_eq!(EventKind::DoubleTap.as_i32(), 11);
    assert_eq!(EventKind::from_i32(11), Ok(EventKind::DoubleTap));
    assert_eq!(EventKind::from_i32(3), Err(BufferError::InvalidEventKind(3)));
}

#[test]
fn events_encode_as_flat_quads() {
    let events = [
        EventRecord { kind: EventKind::Tap, a: 4, b: 1, data: 9 },
        EventRecord { kind: EventKind::DragEnd, a: 4, b: 9, data: 120 },
    ];
    let buf = encode_events(&events);
    assert_eq!(buf, vec![10, 4, 1, 9, 2, 4, 9, 120]);
    assert_eq!(decode_events(&buf).expect("decode"), events.to_vec());
}

#[test]
fn event_decode_rejects_partial_record() {
    assert!(matches!(decode_events(&[10, 1, 1]), Err(BufferError::Stride { .. })));
}

// =============================================================
// Draw paths
// =============================================================

fn stroke(id: u64, points: usize) -> DrawPathRecord {
    DrawPathRecord {
        id,
        color: 0xFF00_00FF,
        line_width: 3.0,
        closed: false,
        points: (0..points)
            .map(|i| DrawPointRecord { x: i as f32, y: 2.0 * i as f32, pressure: 0.5, timestamp: i as f64 * 0.016 })
            .collect(),
    }
}

#[test]
fn draw_path_stream_layout() {
    let buf = encode_draw_paths(&[stroke(1_700_000_000_123, 2)]);
    assert_eq!(buf.len(), DRAW_PATH_HEADER + 2 * DRAW_POINT_STRIDE);
    assert_eq!(buf[0], 1_700_000_000_123.0);
    assert_eq!(buf[1], f64::from(0xFF00_00FF_u32));
    assert_eq!(buf[3], 0.0);
    assert_eq!(buf[4], 2.0);
    assert_eq!(buf[5..9], [0.0, 0.0, 0.5, 0.0]);
}

#[test]
fn draw_path_decoder_advances_by_point_count() {
    let paths = vec![stroke(10, 3), stroke(11, 0), stroke(12, 1)];
    let decoded = decode_draw_paths(&encode_draw_paths(&paths)).expect("decode");
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[0].points.len(), 3);
    assert!(decoded[1].points.is_empty());
    assert_eq!(decoded[2].id, 12);
}

#[test]
fn draw_path_decoder_rejects_truncated_points() {
    let mut buf = encode_draw_paths(&[stroke(1, 2)]);
    buf.pop();
    assert_eq!(decode_draw_paths(&buf), Err(BufferError::Truncated { offset: 0 }));
}

#[test]
fn draw_path_decoder_rejects_truncated_header() {
    let mut buf = encode_draw_paths(&[stroke(1, 1)]);
    buf.extend_from_slice(&[2.0, 0.0]);
    assert_eq!(decode_draw_paths(&buf), Err(BufferError::Truncated { offset: 9 }));
}
