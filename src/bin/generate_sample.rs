//! Writes `sample_pitches.parquet`, a synthetic pitch-tracking table with the
//! same column names as the league exports, for trying the viewer offline.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Per pitch type: speed (km/h), spin (rpm), vertical and horizontal break
/// (cm), spin efficiency (%), typical tilt.
struct Arsenal {
    pitch_type: &'static str,
    speed: f64,
    spin: f64,
    vert: f64,
    horz: f64,
    efficiency: f64,
    tilt: &'static str,
}

const fn arsenal(
    pitch_type: &'static str,
    speed: f64,
    spin: f64,
    vert: f64,
    horz: f64,
    efficiency: f64,
    tilt: &'static str,
) -> Arsenal {
    Arsenal { pitch_type, speed, spin, vert, horz, efficiency, tilt }
}

const PITCHERS: [(&str, &[Arsenal]); 4] = [
    (
        "김민수",
        &[
            arsenal("직구", 146.0, 2350.0, 45.0, 20.0, 95.0, "1:00"),
            arsenal("슬라", 133.0, 2500.0, 5.0, -15.0, 40.0, "9:00"),
            arsenal("포크", 131.0, 1300.0, 8.0, 12.0, 80.0, "1:30"),
        ],
    ),
    (
        "박지훈",
        &[
            arsenal("직구", 149.0, 2450.0, 50.0, 18.0, 97.0, "12:45"),
            arsenal("커터", 140.0, 2400.0, 20.0, -5.0, 55.0, "11:30"),
            arsenal("커브", 121.0, 2650.0, -35.0, -18.0, 85.0, "7:00"),
        ],
    ),
    (
        "이도현",
        &[
            arsenal("투심", 143.0, 2200.0, 28.0, 38.0, 92.0, "2:00"),
            arsenal("체인", 130.0, 1700.0, 18.0, 32.0, 88.0, "2:15"),
            arsenal("스위퍼", 126.0, 2600.0, 2.0, -42.0, 35.0, "9:30"),
        ],
    ),
    (
        "최강",
        &[
            arsenal("직구", 141.0, 2150.0, 38.0, 22.0, 90.0, "1:15"),
            arsenal("너클", 112.0, 400.0, 0.0, 0.0, 10.0, "12:00"),
        ],
    ),
];

const SIDES: [&str; 2] = ["우타", "좌타"];
const RUNNERS: [&str; 5] = ["주자무", "주자무", "1루", "2루", "1,3루"];
const CALLS: [&str; 5] = ["B", "S", "F", "B", "X"];

#[derive(Default)]
struct Columns {
    date: Vec<i32>,
    pitcher: Vec<&'static str>,
    pitch_type: Vec<&'static str>,
    side: Vec<&'static str>,
    runners: Vec<&'static str>,
    call: Vec<&'static str>,
    speed: Vec<f64>,
    spin: Vec<f64>,
    efficiency: Vec<f64>,
    tilt: Vec<&'static str>,
    vert: Vec<f64>,
    horz: Vec<f64>,
    loc_side: Vec<f64>,
    loc_height: Vec<f64>,
    exit_speed: Vec<Option<f64>>,
    rel_height: Vec<f64>,
    rel_side: Vec<f64>,
    extension: Vec<f64>,
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch")?;
    let mut cols = Columns::default();

    // Two seasons, a start every five days from April to September.
    for year in [2023, 2024] {
        let opening = NaiveDate::from_ymd_opt(year, 4, 1).context("opening day")?;
        for (turn, (pitcher, pitches)) in PITCHERS.iter().enumerate() {
            let mut day = opening + Duration::days(turn as i64);
            while day.month() <= 9 {
                let days_since_epoch = (day - epoch).num_days() as i32;
                for _ in 0..(60 + rng.next_u64() % 40) {
                    let p = rng.pick(pitches);
                    cols.date.push(days_since_epoch);
                    cols.pitcher.push(*pitcher);
                    cols.pitch_type.push(p.pitch_type);
                    cols.side.push(*rng.pick(&SIDES));
                    cols.runners.push(*rng.pick(&RUNNERS));
                    let call = *rng.pick(&CALLS);
                    cols.call.push(call);
                    cols.speed.push(rng.gauss(p.speed, 2.0));
                    cols.spin.push(rng.gauss(p.spin, 80.0));
                    cols.efficiency.push(rng.gauss(p.efficiency, 4.0).clamp(0.0, 100.0));
                    cols.tilt.push(p.tilt);
                    cols.vert.push(rng.gauss(p.vert, 4.0));
                    cols.horz.push(rng.gauss(p.horz, 4.0));
                    cols.loc_side.push(rng.gauss(0.0, 0.3));
                    cols.loc_height.push(rng.gauss(0.75, 0.3));
                    cols.exit_speed
                        .push((call == "X" || (call == "F" && rng.chance(0.5))).then(|| rng.gauss(135.0, 15.0)));
                    cols.rel_height.push(rng.gauss(1.8, 0.05));
                    cols.rel_side.push(rng.gauss(-0.5, 0.05));
                    cols.extension.push(rng.gauss(1.9, 0.08));
                }
                day += Duration::days(5);
            }
        }
    }

    let rows = cols.date.len();
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    let number = |name: &str, nullable: bool| Field::new(name, DataType::Float64, nullable);

    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Date32, false),
        text("투수"),
        text("구종"),
        text("타자유형"),
        text("주자"),
        text("심판콜"),
        number("RelSpeed", false),
        number("SpinRate", false),
        number("회전효율", false),
        text("Tilt"),
        number("InducedVertBreak", false),
        number("HorzBreak", false),
        number("PlateLocSide", false),
        number("PlateLocHeight", false),
        number("ExitSpeed", true),
        number("RelHeight", false),
        number("RelSide", false),
        number("Extension", false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(cols.date)),
        Arc::new(StringArray::from(cols.pitcher)),
        Arc::new(StringArray::from(cols.pitch_type)),
        Arc::new(StringArray::from(cols.side)),
        Arc::new(StringArray::from(cols.runners)),
        Arc::new(StringArray::from(cols.call)),
        Arc::new(Float64Array::from(cols.speed)),
        Arc::new(Float64Array::from(cols.spin)),
        Arc::new(Float64Array::from(cols.efficiency)),
        Arc::new(StringArray::from(cols.tilt)),
        Arc::new(Float64Array::from(cols.vert)),
        Arc::new(Float64Array::from(cols.horz)),
        Arc::new(Float64Array::from(cols.loc_side)),
        Arc::new(Float64Array::from(cols.loc_height)),
        Arc::new(Float64Array::from(cols.exit_speed)),
        Arc::new(Float64Array::from(cols.rel_height)),
        Arc::new(Float64Array::from(cols.rel_side)),
        Arc::new(Float64Array::from(cols.extension)),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let output_path = "sample_pitches.parquet";
    let file = std::fs::File::create(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("Wrote {rows} pitches to {output_path}");
    Ok(())
}
