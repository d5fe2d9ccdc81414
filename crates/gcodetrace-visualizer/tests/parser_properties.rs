//! Property tests for the tokenizer, checksum and arc tessellation

use gcodetrace_core::Plane;
use gcodetrace_visualizer::{compute_checksum, parse_line, scan_line, tessellate_arc, ParseOptions};
use glam::DVec3;
use proptest::prelude::*;
use proptest::sample::Index;

fn program_line() -> impl Strategy<Value = String> {
    "N[0-9]{1,4} G[0-3] X-?[0-9]{1,3}\\.[0-9]{1,3} Y[0-9]{1,3} F[1-9][0-9]{2}"
}

proptest! {
    #[test]
    fn scanning_arbitrary_text_never_panics(line in any::<String>()) {
        let tokens = scan_line(&line);
        for (letter, value) in tokens.iter() {
            let specials = "*$%{";
            prop_assert!(letter.is_ascii_uppercase() || specials.contains(letter));
            prop_assert!(line.contains(value));
        }
        let _ = parse_line(&line, &ParseOptions::default());
    }

    #[test]
    fn appended_checksum_validates(body in program_line()) {
        let line = format!("{}*{}", body, compute_checksum(&body));
        let parsed = parse_line(&line, &ParseOptions::default());
        prop_assert!(!parsed.err);
        prop_assert_eq!(parsed.checksum, Some(compute_checksum(&body)));
        prop_assert!(parsed.is_valid());
    }

    #[test]
    fn altered_digit_fails_checksum(body in program_line(), pick in any::<Index>(), shift in 1u8..10) {
        let line = format!("{}*{}", body, compute_checksum(&body));
        let digits: Vec<usize> = body
            .bytes()
            .enumerate()
            .filter(|(_, b)| b.is_ascii_digit())
            .map(|(i, _)| i)
            .collect();
        let at = digits[pick.index(digits.len())];

        let mut bytes = line.into_bytes();
        bytes[at] = b'0' + (bytes[at] - b'0' + shift) % 10;
        let altered = String::from_utf8(bytes).unwrap();

        let parsed = parse_line(&altered, &ParseOptions::default());
        prop_assert!(parsed.err, "{} should fail its checksum", altered);
    }

    #[test]
    fn tessellated_arcs_keep_their_endpoints(
        cx in -50.0f64..50.0,
        cy in -50.0f64..50.0,
        radius in 0.5f64..40.0,
        start in 0.0f64..std::f64::consts::TAU,
        end in 0.0f64..std::f64::consts::TAU,
        clockwise in any::<bool>(),
    ) {
        let center = DVec3::new(cx, cy, 0.0);
        let from = center + DVec3::new(radius * start.cos(), radius * start.sin(), 0.0);
        let to = center + DVec3::new(radius * end.cos(), radius * end.sin(), 0.0);
        let points = tessellate_arc(center, from, to, clockwise, Plane::XY);

        prop_assert!(points.len() >= 2);
        prop_assert_eq!(points.first().copied(), Some(from));
        prop_assert_eq!(points.last().copied(), Some(to));
        for p in &points {
            prop_assert!(((*p - center).length() - radius).abs() < 1e-6);
        }
    }
}
