use ply_text::{parse_ply_bytes, parse_ply_str, read_file, PlyError};

fn header(count: usize, color: bool) -> String {
    let mut h = format!(
        "ply\nformat ascii 1.0\ncomment generated\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\n",
        count
    );
    if color {
        h.push_str("property uchar red\nproperty uchar green\nproperty uchar blue\n");
    }
    h.push_str("end_header\n");
    h
}

#[test]
fn three_rows_without_color() {
    let text = header(3, false) + "0 0 0\n1 0 0\n0 1 0\n";
    let set = parse_ply_str(&text).unwrap();

    assert_eq!(set.position_count(), 3);
    assert!(set.colors.is_none());
    assert_eq!(set.positions, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
}

#[test]
fn colors_are_clamped_and_short_rows_stay_black() {
    let text = header(2, true) + "1 2 3 300 -5 128\n4 5 6\n";
    let set = parse_ply_str(&text).unwrap();

    assert_eq!(set.position_count(), 2);
    let colors = set.colors.as_ref().unwrap();
    assert_eq!(colors.len(), 6);
    assert_eq!(set.color(0), Some([255, 0, 128]));
    assert_eq!(set.color(1), Some([0, 0, 0]));
}

#[test]
fn non_numeric_color_tokens_become_zero() {
    let text = header(1, true) + "0 0 0 red 17 9999\n";
    let set = parse_ply_str(&text).unwrap();
    assert_eq!(set.color(0), Some([0, 17, 255]));
}

#[test]
fn infinite_color_tokens_become_zero() {
    let text = header(2, true) + "0 0 0 inf 10 NaN\n1 1 1 -Infinity infinity 42\n";
    let set = parse_ply_str(&text).unwrap();
    assert_eq!(set.color(0), Some([0, 10, 0]));
    assert_eq!(set.color(1), Some([0, 0, 42]));
}

#[test]
fn blank_lines_in_body_do_not_change_count() {
    for n in [1usize, 2, 5, 17] {
        let mut body = String::new();
        for i in 0..n {
            body.push_str("\n   \n");
            body.push_str(&format!("{} {} {}\n", i, i * 2, i * 3));
        }
        body.push_str("\n\n");

        let set = parse_ply_str(&(header(n, false) + &body)).unwrap();
        assert_eq!(set.position_count(), n);
        assert_eq!(set.positions.len(), 3 * n);
        let last = (n - 1) as f32;
        assert_eq!(&set.positions[3 * (n - 1)..], &[last, last * 2.0, last * 3.0]);
    }
}

#[test]
fn short_rows_do_not_consume_a_vertex_slot() {
    let text = header(2, true) + "1 2\n7\n1 1 1 10 20 30\nfoo bar baz\n2 2 2 40 50 60\n";
    let set = parse_ply_str(&text).unwrap();

    assert_eq!(set.position_count(), 2);
    assert_eq!(set.positions, vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    assert_eq!(set.colors.unwrap(), vec![10, 20, 30, 40, 50, 60]);
}

#[test]
fn trailing_rows_beyond_count_are_ignored() {
    let text = header(2, false) + "0 0 0\n1 1 1\n2 2 2\n3 3 3\n";
    let set = parse_ply_str(&text).unwrap();
    assert_eq!(set.position_count(), 2);
    assert_eq!(set.positions, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
}

#[test]
fn early_end_of_input_keeps_consumed_rows() {
    let text = header(10, true) + "0 0 0 1 2 3\n1 1 1\n";
    let set = parse_ply_str(&text).unwrap();

    assert_eq!(set.position_count(), 2);
    assert_eq!(set.colors.as_ref().map(Vec::len), Some(6));
}

#[test]
fn color_presence_follows_red_declaration() {
    let without = parse_ply_str(&(header(1, false) + "0 0 0 9 9 9\n")).unwrap();
    assert!(!without.has_colors());

    let with = parse_ply_str(&(header(1, true) + "0 0 0 9 9 9\n")).unwrap();
    assert_eq!(with.colors.as_ref().map(Vec::len), Some(3));
}

#[test]
fn first_token_must_be_ply() {
    let err = parse_ply_str("obj\nelement vertex 1\nend_header\n0 0 0\n").unwrap_err();
    assert!(matches!(err, PlyError::NotPly));

    let err = parse_ply_bytes(b"").unwrap_err();
    assert!(matches!(err, PlyError::NotPly));
}

#[test]
fn extra_properties_after_color_are_tolerated() {
    let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\nproperty float opacity\nend_header\n0.5 -0.5 2.5 1 2 3 0.9\n";
    let set = parse_ply_str(text).unwrap();
    assert_eq!(set.positions, vec![0.5, -0.5, 2.5]);
    assert_eq!(set.color(0), Some([1, 2, 3]));
}

#[test]
fn read_file_reports_missing_path() {
    let err = read_file("definitely/not/here.ply").unwrap_err();
    assert!(matches!(err, PlyError::Io(_)));
}
