//! End-to-end pipeline checks on small hand-built tables

use approx::assert_abs_diff_eq;
use life_table_system::input::{load_fertility_from_reader, load_survivorship_from_reader};
use life_table_system::output::{write_entropy_table_to, write_life_table_to};
use life_table_system::{
    CohortKey, FertilityTable, Pipeline, PipelineConfig, RecordingReporter, SurvivorshipTable,
};

const SURVIVORSHIP_CSV: &str = "\
country_code,suffix,year,age,lx
AAA,,2000,0,1.0
AAA,,2000,1,0.9
AAA,,2000,2,0.8
AAA,,2000,3,0.0
BBB,TE,2000,0,1.0
BBB,TE,2000,1,0.95
BBB,TE,2000,2,0.85
BBB,TE,2000,3,0.7
BBB,TE,2000,4,0.5
CCC,,2000,0,1.0
";

const FERTILITY_CSV: &str = "\
country_code,suffix,year,age,mx
AAA,,2000,0,0.4
AAA,,2000,2,0.1
BBB,TE,2000,1,
BBB,TE,2000,3,0.2
BBB,,2000,3,0.2
";

fn inputs() -> (SurvivorshipTable, FertilityTable) {
    (
        load_survivorship_from_reader(SURVIVORSHIP_CSV.as_bytes()).unwrap(),
        load_fertility_from_reader(FERTILITY_CSV.as_bytes()).unwrap(),
    )
}

fn config() -> PipelineConfig {
    PipelineConfig {
        min_age: 0,
        max_age: 3,
        ..Default::default()
    }
}

fn render(pipeline: &Pipeline<RecordingReporter>) -> (String, String) {
    let (hmd, hfd) = inputs();
    let output = pipeline.run(&hmd, &hfd).unwrap();

    let mut life_table = Vec::new();
    write_life_table_to(&output.life_table, &mut life_table).unwrap();
    let mut entropy = Vec::new();
    write_entropy_table_to(&output.entropy, &mut entropy).unwrap();
    (
        String::from_utf8(life_table).unwrap(),
        String::from_utf8(entropy).unwrap(),
    )
}

#[test]
fn toy_cohorts_merge_and_entropy() {
    let (hmd, hfd) = inputs();
    let pipeline = Pipeline::new(config(), RecordingReporter::new());
    let output = pipeline.run(&hmd, &hfd).unwrap();

    // AAA and BBB/TE are common; BBB with no suffix and CCC are not
    assert_eq!(output.summary.common_cohorts, 2);
    assert_eq!(output.life_table.len(), 2 * 4);
    assert_eq!(output.life_table.cohort_count(), 2);

    for row in output.life_table.rows() {
        // Every age here is below the fertility band
        assert_eq!(row.mx, Some(0.0));
        assert_eq!(row.lxmx.map(|v| v == 0.0), row.lx.map(|_| true));
    }

    let aaa = CohortKey::new("AAA", None, 2000);
    let bbb = CohortKey::new("BBB", Some("TE"), 2000);

    // Age 4 of BBB/TE lies outside [0, 3] and is not joined
    let last = output.life_table.get(&bbb, 3).unwrap();
    assert_eq!(last.lx, Some(0.7));
    assert_eq!(last.dx, None);
    assert_eq!(last.qx, None);
    assert_eq!(last.sx, None);

    // lx hits zero at the last age of AAA; qx at age 2 is 1
    assert_eq!(output.life_table.get(&aaa, 2).unwrap().qx, Some(1.0));

    let h_a = output.entropy.get(&aaa).unwrap();
    let h_b = output.entropy.get(&bbb).unwrap();
    assert!(h_a.is_finite() && h_b.is_finite());
    assert_abs_diff_eq!(h_a, 0.5816993464052288, epsilon = 1e-12);
    assert_abs_diff_eq!(h_b, 0.4946749226006191, epsilon = 1e-12);
    assert_eq!(output.entropy.excluded_count(), 0);
}

#[test]
fn grid_rows_equal_cohorts_times_ages() {
    let (hmd, hfd) = inputs();
    for max_age in [0u32, 1, 5, 20] {
        let config = PipelineConfig {
            min_age: 0,
            max_age,
            ..Default::default()
        };
        let output = Pipeline::new(config, RecordingReporter::new())
            .run(&hmd, &hfd)
            .unwrap();
        assert_eq!(output.life_table.len(), 2 * (max_age as usize + 1));
        assert_eq!(
            output.life_table.len(),
            output.life_table.cohort_count() * output.life_table.age_range().span()
        );

        let mut pairs: Vec<(&CohortKey, u32)> = output
            .life_table
            .rows()
            .iter()
            .map(|r| (&r.key, r.age))
            .collect();
        let before = pairs.len();
        pairs.dedup();
        assert_eq!(pairs.len(), before);
    }
}

#[test]
fn fertility_band_applies_to_wide_range() {
    let (hmd, hfd) = inputs();
    let config = PipelineConfig {
        min_age: 0,
        max_age: 60,
        fertility_min_age: 2,
        fertility_max_age: 3,
        ..Default::default()
    };
    let output = Pipeline::new(config, RecordingReporter::new())
        .run(&hmd, &hfd)
        .unwrap();

    let aaa = CohortKey::new("AAA", None, 2000);
    let bbb = CohortKey::new("BBB", Some("TE"), 2000);
    let table = &output.life_table;

    assert_eq!(table.get(&aaa, 0).unwrap().mx, Some(0.0));
    assert_eq!(table.get(&aaa, 2).unwrap().mx, Some(0.1));
    assert_eq!(table.get(&aaa, 3).unwrap().mx, None);
    assert_eq!(table.get(&bbb, 1).unwrap().mx, Some(0.0));
    assert_eq!(table.get(&bbb, 3).unwrap().mx, Some(0.2));
    assert!(table
        .rows()
        .iter()
        .filter(|r| r.age > 4)
        .all(|r| r.mx == Some(0.0) && r.lx.is_none()));

    // BBB/TE still has lx at age 4; trailing ages without lx are trimmed
    // before the entropy step
    assert!(output.entropy.get(&aaa).is_some());
    assert!(output.entropy.get(&bbb).is_some());
}

#[test]
fn reruns_are_byte_identical() {
    let first = render(&Pipeline::new(config(), RecordingReporter::new()));
    let second = render(&Pipeline::new(config(), RecordingReporter::new()));
    assert_eq!(first, second);
    assert!(first.0.starts_with("country_code,suffix,year,age,lx,mx,lxmx,dx,qx,sx,vx\n"));
    assert_eq!(first.1.lines().count(), 3);
}

#[test]
fn missing_age_zero_is_excluded_not_fatal() {
    let (hmd, hfd) = inputs();
    let config = PipelineConfig {
        min_age: 1,
        max_age: 3,
        ..Default::default()
    };
    let pipeline = Pipeline::new(config, RecordingReporter::new());
    let output = pipeline.run(&hmd, &hfd).unwrap();

    assert_eq!(output.life_table.len(), 2 * 3);
    assert!(output.entropy.is_empty());
    assert_eq!(output.entropy.excluded_count(), 2);
    assert!(pipeline.reporter().warning_count() >= 1);
}
