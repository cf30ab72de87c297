use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic sediment core (age model, XRF scan, MS scan) and a
/// matching plot configuration.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "sample")]
    out: PathBuf,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Age model: depth in column A, modelled age in column F
// ---------------------------------------------------------------------------

fn write_age_model(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut w = csv::Writer::from_path(path).context("creating age model CSV")?;
    w.write_record(["MCD (mm)", "min", "max", "median", "mean", "Age"])?;

    let mut rows = 0;
    let mut age = 2019.0;
    for i in 0..=76 {
        let depth = i as f64 * 5.0;
        if i > 0 {
            // Accumulation slows down with depth (compaction).
            age -= 2.0 + depth / 120.0 + rng.gauss(0.0, 0.3).abs();
        }
        let spread = 1.0 + depth / 40.0;
        w.write_record([
            format!("{depth:.1}"),
            format!("{:.1}", age - spread),
            format!("{:.1}", age + spread),
            format!("{age:.1}"),
            format!("{age:.1}"),
            format!("{age:.1}"),
        ])?;
        rows += 1;
    }
    w.flush()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// XRF scan: depth in column C, titanium counts in column N
// ---------------------------------------------------------------------------

fn write_xrf(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let header = [
        "Sample", "Section", "Depth (mm)", "cps", "MSE", "Al", "Si", "P", "S", "Cl", "Ar", "K",
        "Ca", "Ti",
    ];
    let mut w = csv::Writer::from_path(path).context("creating XRF CSV")?;
    w.write_record(header)?;

    // Flood / erosion layers as titanium peaks.
    let layers = [(62.0, 4.0, 2400.0), (181.0, 9.0, 3100.0), (297.0, 3.0, 1800.0)];

    let mut rows = 0;
    for i in 0..=380 {
        let depth = i as f64;
        let ti: f64 = 1200.0
            + layers
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(depth, mu, sigma, amp))
                .sum::<f64>()
            + rng.gauss(0.0, 60.0);

        // Scanner dropouts show up as NA cells.
        let ti_cell = if i % 97 == 41 {
            "NA".to_string()
        } else {
            format!("{:.0}", ti.max(0.0))
        };

        let mut record: Vec<String> = vec![
            "NTG-118".to_string(),
            format!("{}", i / 100 + 1),
            format!("{depth:.1}"),
            format!("{:.0}", 40_000.0 + rng.gauss(0.0, 500.0)),
            format!("{:.2}", 1.0 + rng.gauss(0.0, 0.05).abs()),
        ];
        for _ in 0..8 {
            record.push(format!("{:.0}", 500.0 + rng.gauss(0.0, 40.0)));
        }
        record.push(ti_cell);
        w.write_record(&record)?;
        rows += 1;
    }
    w.flush()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Magnetic susceptibility: named columns, depth in cm
// ---------------------------------------------------------------------------

fn write_ms(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let depth: Vec<f64> = (0..=76).map(|i| i as f64 * 0.5).collect();
    let ms: Vec<f64> = depth
        .iter()
        .map(|&d| 8.0 + gaussian(d, 18.1, 1.2, 25.0) + rng.gauss(0.0, 0.8))
        .collect();
    let rows = depth.len();

    let schema = Arc::new(Schema::new(vec![
        Field::new("Core Pos. (cm)", DataType::Float64, false),
        Field::new("Raw Data", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(depth)),
            Arc::new(Float64Array::from(ms)),
        ],
    )
    .context("building MS record batch")?;

    let file = std::fs::File::create(path).context("creating MS parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(rows)
}

fn config_json() -> serde_json::Value {
    serde_json::json!({
        "figure": {
            "title": "NTG compiled",
            "size_cm": [30.0, 9.6],
            "wspace": 0.5
        },
        "age_model": {
            "title": "Age model",
            "x_label": "Years cal. AD",
            "y_label": "Depth (mm)",
            "invert_x": true,
            "zero_margins": true,
            "source": {
                "path": "age-model.csv",
                "depth_column": { "letter": "A" },
                "value_column": { "letter": "F" }
            }
        },
        "titanium": {
            "title": "Titanium",
            "x_label": "Ti (cps)",
            "y_label": "Depth (mm)",
            "source": {
                "path": "xrf.csv",
                "depth_column": { "letter": "C" },
                "value_column": { "letter": "N" }
            }
        },
        "extra_panels": [
            {
                "title": "Magnetic Susceptibility",
                "x_label": "MS",
                "y_label": "Depth (mm)",
                "source": {
                    "path": "ms.parquet",
                    "depth_column": { "name": "Core Pos. (cm)" },
                    "value_column": { "name": "Raw Data" },
                    "depth_scale": 10.0,
                    "enabled": false
                }
            }
        ],
        "age_scale": { "enabled": true, "label": "Years AD" },
        "export": { "path": "NTG-compiled.svg", "enabled": false }
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut rng = SimpleRng::new(42);

    let age_rows = write_age_model(&args.out.join("age-model.csv"), &mut rng)?;
    let xrf_rows = write_xrf(&args.out.join("xrf.csv"), &mut rng)?;
    let ms_rows = write_ms(&args.out.join("ms.parquet"), &mut rng)?;

    let config_path = args.out.join("sediment-plot.json");
    let text = serde_json::to_string_pretty(&config_json())?;
    std::fs::write(&config_path, text)
        .with_context(|| format!("writing {}", config_path.display()))?;

    println!(
        "Wrote age model ({age_rows} rows), XRF ({xrf_rows} rows) and MS ({ms_rows} rows) to {}",
        args.out.display()
    );
    println!(
        "Run: sediment-plot --config {}",
        config_path.display()
    );
    Ok(())
}
