//! Shared fixtures: a synthetic heart disease CSV in the UCI layout

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub const HEADER: &str = "age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal,num";

/// One CSV row per patient; `?` appears in `ca` and `thal` only
pub fn heart_rows(n: usize, seed: u64) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let sick = i % 5 < 2;
            let age = if sick { rng.gen_range(50..75) } else { rng.gen_range(30..62) };
            let sex = rng.gen_range(0..2);
            let cp = if sick { rng.gen_range(3..5) } else { rng.gen_range(1..4) };
            let trestbps = rng.gen_range(100..170);
            let chol = rng.gen_range(170..320);
            let fbs = rng.gen_range(0..2);
            let restecg = rng.gen_range(0..3);
            let thalach = if sick { rng.gen_range(100..150) } else { rng.gen_range(140..195) };
            let exang = if sick { (rng.gen_range(0..10) < 7) as i32 } else { (rng.gen_range(0..10) < 2) as i32 };
            let oldpeak: f64 = if sick { rng.gen_range(1.0..4.0) } else { rng.gen_range(0.0..1.5) };
            let slope = rng.gen_range(1..4);
            let ca = if i % 37 == 5 { "?".to_string() } else if sick { rng.gen_range(1..4).to_string() } else { rng.gen_range(0..2).to_string() };
            let thal = if i % 41 == 7 { "?".to_string() } else if sick { "7".to_string() } else { "3".to_string() };
            let num = if sick { rng.gen_range(1..5) } else { 0 };
            format!(
                "{age},{sex},{cp},{trestbps},{chol},{fbs},{restecg},{thalach},{exang},{oldpeak:.1},{slope},{ca},{thal},{num}"
            )
        })
        .collect()
}

pub fn write_csv(dir: &Path, name: &str, header: &str, rows: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::from(header);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

pub fn write_heart_csv(dir: &Path) -> PathBuf {
    write_csv(dir, "heart.csv", HEADER, &heart_rows(200, 7))
}

/// The reference request body
pub fn sample_payload() -> Value {
    json!({
        "age": 63, "sex": 1, "chest_pain": 1, "resting_bp": 145, "chol": 233,
        "fasting_bs": 1, "rest_ecg": 2, "max_hr": 150, "exercise_angina": 0,
        "oldpeak": 2.3, "st_slope": 3, "Ca": 0, "thal": 6
    })
}
