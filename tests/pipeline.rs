//! End-to-end runs of the recognizer with hand-built weights and synthetic
//! canvases.

use digit_vision::core_modules::grid_manager::{FEATURE_LEN, GRID_SIZE};
use digit_vision::core_modules::prediction::NUM_CLASSES;
use digit_vision::core_modules::utils::image_helper::image_helper::{load_rgba, save_rgba};
use digit_vision::core_modules::utils::weights_file::load_weights_json;
use digit_vision::{
    ClassifierConfig, ClassifierPool, DigitClassifier, NetworkWeights, OwnedImage,
    PreconditionError, SoftmaxMode,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const CANVAS: usize = 280;
const BLOCK: usize = CANVAS / GRID_SIZE;
/// Stroke color of the drawing surface.
const INK: u8 = 0x21;

fn scratch(name: &str) -> PathBuf {
    // Tests run in parallel; give every call its own file.
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("digit_vision_it_{}_{n}_{name}", std::process::id()))
}

/// Two hidden features: ink in the central column band, and ink far from it.
/// A "1" lights the first, a "0" the second.
fn zero_vs_one_weights() -> serde_json::Value {
    let mut w1 = vec![vec![0.0f64; 2]; FEATURE_LEN];
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let feature = &mut w1[row * GRID_SIZE + col];
            if (13..=15).contains(&col) {
                feature[0] = 1.0;
            } else if col <= 10 || col >= 18 {
                feature[1] = 1.0;
            }
        }
    }
    let w2 = vec![vec![1.0f64, 0.0], vec![0.0, 1.0]];
    let mut w3 = vec![vec![0.0f64; NUM_CLASSES]; 2];
    w3[0][1] = 0.5;
    w3[1][1] = -0.5;
    w3[0][0] = -0.5;
    w3[1][0] = 0.5;

    json!({
        "w1": w1, "b1": [0.0, 0.0],
        "w2": w2, "b2": [0.0, 0.0],
        "w3": w3, "b3": vec![0.0f64; NUM_CLASSES],
    })
}

fn load_weights() -> NetworkWeights {
    let path = scratch("weights.json");
    std::fs::write(&path, zero_vs_one_weights().to_string()).unwrap();
    let weights = load_weights_json(&path).unwrap();
    std::fs::remove_file(&path).ok();
    weights
}

fn paint_cell(canvas: &mut OwnedImage, row: usize, col: usize) {
    canvas.paint_rect(col * BLOCK, row * BLOCK, BLOCK, BLOCK, INK);
}

fn vertical_bar(col: usize) -> OwnedImage {
    let mut canvas = OwnedImage::blank(CANVAS, CANVAS).unwrap();
    for row in 4..24 {
        paint_cell(&mut canvas, row, col);
    }
    canvas
}

fn ring() -> OwnedImage {
    let mut canvas = OwnedImage::blank(CANVAS, CANVAS).unwrap();
    for col in 8..=20 {
        paint_cell(&mut canvas, 5, col);
        paint_cell(&mut canvas, 22, col);
    }
    for row in 6..=21 {
        paint_cell(&mut canvas, row, 8);
        paint_cell(&mut canvas, row, 20);
    }
    canvas
}

fn classifier(mode: SoftmaxMode) -> DigitClassifier {
    let config = ClassifierConfig {
        softmax: mode,
        workers: None,
    };
    DigitClassifier::new(&config, Arc::new(load_weights()))
}

#[test]
fn recognizes_a_one_and_a_zero() {
    let classifier = classifier(SoftmaxMode::Literal);

    let one = classifier.classify(&vertical_bar(14).as_buffer().unwrap()).unwrap();
    assert_eq!(one.digit, 1);
    assert!(one.prediction.confidence() > 0.9);

    let zero = classifier.classify(&ring().as_buffer().unwrap()).unwrap();
    assert_eq!(zero.digit, 0);
    assert!(zero.prediction.confidence() > 0.9);
}

#[test]
fn off_center_one_is_still_a_one() {
    let classifier = classifier(SoftmaxMode::Literal);
    let centered = classifier.classify(&vertical_bar(14).as_buffer().unwrap()).unwrap();
    let shifted = classifier.classify(&vertical_bar(3).as_buffer().unwrap()).unwrap();

    assert_eq!(shifted.shift.dy, 3 - 14);
    assert_eq!(shifted.digit, 1);
    assert_eq!(shifted.prediction, centered.prediction);
}

#[test]
fn predictions_sum_to_one() {
    let classifier = classifier(SoftmaxMode::Literal);
    for canvas in [vertical_bar(14), vertical_bar(22), ring()] {
        let result = classifier.classify(&canvas.as_buffer().unwrap()).unwrap();
        assert!((result.prediction.sum() - 1.0).abs() < 1e-6);
        assert!(
            result
                .prediction
                .probabilities()
                .iter()
                .all(|&p| (0.0..=1.0).contains(&p))
        );
    }
}

#[test]
fn blank_canvas_is_uniform() {
    let classifier = classifier(SoftmaxMode::Literal);
    let result = classifier
        .classify(&OwnedImage::blank(CANVAS, CANVAS).unwrap().as_buffer().unwrap())
        .unwrap();
    assert!(result.blank_canvas);
    assert!(result.shift.is_zero());
    for &p in result.prediction.probabilities() {
        assert_eq!(p, 1.0 / NUM_CLASSES as f32);
    }
}

#[test]
fn repeated_runs_are_identical() {
    let classifier = classifier(SoftmaxMode::Literal);
    let canvas = ring();
    let buffer = canvas.as_buffer().unwrap();
    let first = classifier.classify(&buffer).unwrap();
    for _ in 0..5 {
        assert_eq!(classifier.classify(&buffer).unwrap().prediction, first.prediction);
    }
}

#[test]
fn stabilized_mode_agrees_on_ordinary_input() {
    let literal = classifier(SoftmaxMode::Literal);
    let stable = classifier(SoftmaxMode::Stabilized);
    let canvas = ring();
    let buffer = canvas.as_buffer().unwrap();
    let a = literal.classify(&buffer).unwrap();
    let b = stable.classify(&buffer).unwrap();
    assert_eq!(a.digit, b.digit);
    for digit in 0..NUM_CLASSES {
        assert!((a.prediction.probability(digit) - b.prediction.probability(digit)).abs() < 1e-6);
    }
}

#[test]
fn canvas_loaded_from_png_classifies_the_same() {
    let path = scratch("ring.png");
    let canvas = ring();
    save_rgba(&path, &canvas).unwrap();
    let loaded = load_rgba(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let classifier = classifier(SoftmaxMode::Literal);
    let direct = classifier.classify(&canvas.as_buffer().unwrap()).unwrap();
    let decoded = classifier.classify(&loaded.as_buffer().unwrap()).unwrap();
    assert_eq!(direct.prediction, decoded.prediction);
}

#[test]
fn non_canonical_sizes_are_accepted_when_divisible() {
    let classifier = classifier(SoftmaxMode::Literal);
    let canvas = OwnedImage::blank(56, 56).unwrap();
    assert!(classifier.classify(&canvas.as_buffer().unwrap()).is_ok());

    let canvas = OwnedImage::blank(300, 300).unwrap();
    assert_eq!(
        classifier.classify(&canvas.as_buffer().unwrap()).unwrap_err(),
        PreconditionError::NotGridDivisible {
            size: 300,
            grid: GRID_SIZE
        }
    );
}

#[tokio::test]
async fn pool_matches_direct_classification() {
    let weights = Arc::new(load_weights());
    let config = ClassifierConfig {
        softmax: SoftmaxMode::Literal,
        workers: Some(3),
    };
    let pool = ClassifierPool::new(&config, weights.clone());
    let direct = DigitClassifier::new(&config, weights);

    let canvases = vec![ring(), vertical_bar(14), vertical_bar(5), ring()];
    let expected: Vec<usize> = canvases
        .iter()
        .map(|c| direct.classify(&c.as_buffer().unwrap()).unwrap().digit)
        .collect();
    assert_eq!(expected, vec![0, 1, 1, 0]);

    let digits: Vec<usize> = pool
        .classify_all(canvases)
        .await
        .into_iter()
        .map(|r| r.unwrap().digit)
        .collect();
    assert_eq!(digits, expected);
}
