use super::*;
use crate::model::TraitMap;

fn red_columns(path: &Path, row: u32) -> Vec<u32> {
    let img = image::open(path).unwrap().to_rgb8();
    (0..img.width())
        .filter(|&x| {
            let p = img.get_pixel(x, row);
            p[0] > 200 && p[1] < 80 && p[2] < 80
        })
        .collect()
}

/// Plot area spans from the y-label area to the right margin.
fn expected_column(score: f64) -> f64 {
    let left = 20.0 + 60.0;
    let right = FIGURE_SIZE.0 as f64 - 20.0;
    left + (score - DOMAIN_MIN) / (DOMAIN_MAX - DOMAIN_MIN) * (right - left)
}

#[test]
fn test_histogram_integrates_to_one() {
    let values = [1.0, 1.5, 2.0, 2.0, 3.0, 4.5, 5.0];
    let bins = histogram_density(&values, HIST_BINS);
    assert_eq!(bins.len(), HIST_BINS);
    let area: f64 = bins.iter().map(|b| b.density * (b.hi - b.lo)).sum();
    assert!((area - 1.0).abs() < 1e-9);
    assert_eq!(bins[0].lo, 1.0);
    assert!((bins[HIST_BINS - 1].hi - 5.0).abs() < 1e-9);
    // The maximum lands in the last bin.
    assert!(bins[HIST_BINS - 1].density > 0.0);
}

#[test]
fn test_histogram_constant_sample() {
    let bins = histogram_density(&[3.0, 3.0], HIST_BINS);
    assert!((bins[0].lo - 2.5).abs() < 1e-12);
    assert!((bins[HIST_BINS - 1].hi - 3.5).abs() < 1e-12);
    let area: f64 = bins.iter().map(|b| b.density * (b.hi - b.lo)).sum();
    assert!((area - 1.0).abs() < 1e-9);
}

#[test]
fn test_scott_bandwidth() {
    assert_eq!(scott_bandwidth(&[2.0]), MIN_BANDWIDTH);
    assert_eq!(scott_bandwidth(&[4.0, 4.0, 4.0]), MIN_BANDWIDTH);
    // Sample std of [1, 3] is sqrt(2).
    let bw = scott_bandwidth(&[1.0, 3.0]);
    assert!((bw - 2f64.sqrt() * 2f64.powf(-0.2)).abs() < 1e-12);
}

#[test]
fn test_kde_integrates_to_about_one() {
    let values = [2.5, 3.0, 3.5];
    let curve = kde_curve(&values, scott_bandwidth(&values), -5.0, 11.0, 2000);
    let step = curve[1].0 - curve[0].0;
    let area: f64 = curve.iter().map(|&(_, y)| y * step).sum();
    assert!((area - 1.0).abs() < 1e-3);
    assert_eq!(curve.first().unwrap().0, -5.0);
}

#[test]
fn test_render_writes_figure_with_marker() {
    let dir = tempfile::tempdir().unwrap();
    let cohort = [4.0, 2.0, 3.0];
    let mut columns = Vec::new();
    for (i, &score) in cohort.iter().enumerate() {
        let path = dir.path().join(format!("{i}.png"));
        render_distribution(&path, Trait::Extraversion, &cohort, score).unwrap();
        assert_eq!(
            image::image_dimensions(&path).unwrap(),
            FIGURE_SIZE
        );
        let red = red_columns(&path, FIGURE_SIZE.1 / 2);
        assert!(!red.is_empty(), "no marker for {score}");
        let mean = red.iter().map(|&x| x as f64).sum::<f64>() / red.len() as f64;
        assert!(
            (mean - expected_column(score)).abs() < 8.0,
            "marker for {score} at {mean}"
        );
        columns.push(mean);
    }
    assert!(columns[1] < columns[2] && columns[2] < columns[0]);
}

fn dark_pixels_below_plot(path: &Path) -> usize {
    let img = image::open(path).unwrap().to_rgb8();
    let plot_bottom = FIGURE_SIZE.1 - 20 - 70;
    (plot_bottom + 5..img.height())
        .flat_map(|y| (0..img.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let p = img.get_pixel(x, y);
            p[0] < 100 && p[1] < 100 && p[2] < 100
        })
        .count()
}

#[test]
fn test_chart_font_registers_once() {
    ensure_chart_font().unwrap();
    ensure_chart_font().unwrap();
}

#[test]
fn test_render_draws_axis_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labelled.png");
    render_distribution(&path, Trait::Agreeableness, &[1.5, 2.5, 4.0], 2.5).unwrap();
    // Tick numbers and the axis description sit under the plot area.
    assert!(dark_pixels_below_plot(&path) > 100);
}

#[test]
fn test_render_single_member_cohort() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solo.png");
    render_distribution(&path, Trait::Openness, &[3.7], 3.7).unwrap();
    assert!(path.exists());
}

#[test]
fn test_render_out_of_range_score_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.png");
    render_distribution(&path, Trait::Neuroticism, &[0.0, 3.0, 7.0], 7.0).unwrap();
    assert!(red_columns(&path, FIGURE_SIZE.1 / 2).is_empty());
}

#[test]
fn test_render_individual_registers_all_traits() {
    let dir = tempfile::tempdir().unwrap();
    let scratch = ScratchDir::acquire(&dir.path().join("tmp")).unwrap();
    let table = crate::model::ScoreTable {
        records: vec![
            ScoreRecord {
                name: "Alice".to_string(),
                raw: TraitMap::from_fn(|t| 1.0 + t.index() as f64),
            },
            ScoreRecord {
                name: "Bob".to_string(),
                raw: TraitMap::from_fn(|_| 2.0),
            },
        ],
    };
    let cohort = table.cohort();
    let artifacts = render_individual(&scratch, &cohort, 0, &table.records[0]).unwrap();
    assert_eq!(artifacts.len(), Trait::ALL.len());
    for t in Trait::ALL {
        let path = artifacts.get(t).unwrap().to_path_buf();
        assert!(path.exists());
        assert!(path.starts_with(scratch.path()));
    }
    artifacts.reclaim().unwrap();
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    scratch.release().unwrap();
}
