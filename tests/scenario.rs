use std::fs;

use biosim::{
    animal::Species,
    error::ConfigError,
    params::{ParameterOverrides, SpeciesOverrides},
    scenario::ScenarioLoader,
    terrain::Coordinate,
};
use tempfile::tempdir;

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn tiny_island_loads_and_runs() {
    let scenario = scenario_loader()
        .load("scenarios/tiny_island.yaml")
        .expect("scenario should load");
    assert_eq!(scenario.name, "tiny_island");

    let mut sim = scenario.build_simulation(None).expect("simulation builds");
    assert_eq!(sim.island().population_counts(), (50, 10));
    assert_eq!(sim.island().grid().render().lines().count(), 6);

    let mut years = Vec::new();
    sim.run_with_hook(8, |summary| years.push(summary.year))
        .expect("run succeeds");
    assert_eq!(years, (1..=8).collect::<Vec<_>>());
}

#[test]
fn seed_override_reproduces_runs() {
    let scenario = scenario_loader()
        .load("scenarios/tiny_island.yaml")
        .unwrap();
    let history = |seed| {
        let mut sim = scenario.build_simulation(Some(seed)).unwrap();
        sim.run(15).unwrap();
        sim.history().to_vec()
    };
    assert_eq!(history(3), history(3));
}

#[test]
fn scenario_written_to_disk_loads() {
    let dir = tempdir().expect("tempdir");
    let yaml = r#"
name: disk
seed: 1
years: 3
map: |
  WWWW
  WLDW
  WWWW
population:
  - row: 1
    col: 2
    animals:
      - species: carnivore
        age: 2
        weight: 12.5
        count: 3
"#;
    fs::write(dir.path().join("disk.yaml"), yaml).unwrap();

    let scenario = ScenarioLoader::new(dir.path()).load("disk.yaml").unwrap();
    assert_eq!(scenario.years(None), 3);
    let island = scenario.build_island().unwrap();
    let cell = island.cell(Coordinate::new(1, 2)).unwrap();
    assert_eq!(cell.population_counts(), (0, 3));
    assert!(cell
        .residents(Species::Carnivore)
        .iter()
        .all(|animal| animal.age() == 2 && animal.weight() == 12.5));
}

#[test]
fn missing_file_reports_its_path() {
    let dir = tempdir().unwrap();
    let err = ScenarioLoader::new(dir.path()).load("absent.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"));
}

#[test]
fn bad_map_surfaces_a_config_error() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("bad.yaml"),
        "name: bad\nseed: 1\nmap: |\n  WWW\n  WLL\n  WWW\n",
    )
    .unwrap();
    let scenario = ScenarioLoader::new(dir.path()).load("bad.yaml").unwrap();
    let err = scenario.build_island().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::BorderNotWater { .. })
    ));
}

#[test]
fn parameters_can_change_between_runs() {
    let scenario = scenario_loader()
        .load("scenarios/tiny_island.yaml")
        .unwrap();
    let mut island = scenario.build_island().unwrap();

    let overrides = ParameterOverrides {
        herbivore: Some(SpeciesOverrides {
            migration_scale: Some(0.0),
            ..Default::default()
        }),
        ..Default::default()
    };
    island.update_parameters(&overrides).unwrap();
    assert_eq!(island.params().herbivore.migration_scale, 0.0);

    let rejected = ParameterOverrides {
        herbivore: Some(SpeciesOverrides {
            appetite: Some(-1.0),
            migration_scale: Some(0.5),
            ..Default::default()
        }),
        ..Default::default()
    };
    assert!(island.update_parameters(&rejected).is_err());
    assert_eq!(island.params().herbivore.migration_scale, 0.0);
}

#[test]
fn population_entries_may_omit_weight() {
    let dir = tempdir().unwrap();
    let yaml = "\
name: weightless
seed: 9
map: |
  WWWW
  WLLW
  WWWW
population:
  - row: 1
    col: 1
    animals:
      - species: herbivore
        count: 5
";
    fs::write(dir.path().join("weightless.yaml"), yaml).unwrap();

    let scenario = ScenarioLoader::new(dir.path())
        .load("weightless.yaml")
        .expect("weight is optional");
    let sim = scenario.build_simulation(None).unwrap();
    let herd = sim
        .island()
        .cell(Coordinate::new(1, 1))
        .unwrap()
        .residents(Species::Herbivore);
    assert_eq!(herd.len(), 5);
    assert!(herd.iter().all(|animal| animal.age() == 0 && animal.weight() > 0.0));
}

#[test]
fn cleared_island_can_be_repopulated() {
    let scenario = scenario_loader()
        .load("scenarios/tiny_island.yaml")
        .unwrap();
    let mut sim = scenario.build_simulation(None).unwrap();
    sim.run(5).unwrap();

    let removed = sim.clear_population();
    assert!(removed.total() > 0);
    assert_eq!(sim.island().aggregate_counts().total(), 0);

    sim.seed(&scenario.population).unwrap();
    assert_eq!(sim.island().population_counts(), (50, 10));
    sim.run(1).unwrap();
    assert_eq!(sim.current_year(), 6);
}
