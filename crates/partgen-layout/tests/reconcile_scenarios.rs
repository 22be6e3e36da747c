use partgen_core::{Error, Unit};
use partgen_layout::{Board, Bus, PinSpec, RowSelection, SchematicSide, reconcile};

fn micro() -> Board {
    Board::microcontroller("ArduinoMicro", Unit::Millimeter, 48.0, 18.0, 2.54).unwrap()
}

fn gnd_board() -> Board {
    let mut board = micro();
    board
        .add_pin_row(
            "upper",
            [3.81, 1.27],
            [2.54, 0.0],
            vec![
                PinSpec::at("D2", SchematicSide::Right, 13),
                PinSpec::alias("GND-2", "GND"),
            ],
        )
        .unwrap();
    board
        .add_pin_row(
            "lower",
            [3.81, 16.51],
            [2.54, 0.0],
            vec![PinSpec::at("GND", SchematicSide::Bottom, 5)],
        )
        .unwrap();
    board
}

#[test]
fn alias_registered_before_its_target() {
    let board = gnd_board();
    let rec = board.reconcile().unwrap();

    assert_eq!(rec.aliases.len(), 1);
    assert_eq!(rec.aliases_of("GND"), ["GND-2"]);
    assert_eq!(rec.buses.len(), 1);
    let bus = &rec.buses[0];
    assert!(bus.contains("GND"));
    assert!(bus.contains("GND-2"));
    assert_eq!(bus.members.len(), 2);
    assert!(rec.bus_of("D2").is_none());
}

#[test]
fn reconciling_twice_is_identical() {
    let board = gnd_board();
    let first = board.reconcile().unwrap();
    let second = board.reconcile().unwrap();
    assert_eq!(first, second);
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

#[test]
fn duplicate_name_across_rows() {
    let mut board = micro();
    board
        .add_pin_row(
            "upper",
            [3.81, 1.27],
            [2.54, 0.0],
            vec![PinSpec::at("D2", SchematicSide::Right, 13)],
        )
        .unwrap();
    let err = board
        .add_pin_row(
            "lower",
            [3.81, 16.51],
            [2.54, 0.0],
            vec![PinSpec::at("D2", SchematicSide::Right, 14)],
        )
        .unwrap_err();
    assert_eq!(err, Error::DuplicateName { name: "D2".into() });
}

#[test]
fn unresolved_alias_fails_at_reconciliation() {
    let mut board = micro();
    board
        .add_pin_row(
            "upper",
            [3.81, 1.27],
            [2.54, 0.0],
            vec![
                PinSpec::at("D2", SchematicSide::Right, 13),
                PinSpec::alias("X-2", "X"),
            ],
        )
        .unwrap();
    let err = board.reconcile().unwrap_err();
    assert_eq!(
        err,
        Error::UnresolvedAlias {
            from: "X-2".into(),
            target: "X".into()
        }
    );
}

#[test]
fn every_named_pin_is_indexed_once() {
    let board = gnd_board();
    let catalog = board.catalog();
    let names: Vec<&str> = catalog
        .named_pins(RowSelection::All)
        .filter_map(|p| p.name())
        .collect();
    assert_eq!(names, ["D2", "GND-2", "GND"]);
    for name in names {
        assert_eq!(catalog.find_pin(name).and_then(|p| p.name()), Some(name));
    }
    assert_eq!(catalog.len(), 3);
}

#[test]
fn breadboard_63_pins_gaps_every_sixth_socket() {
    let mut board = Board::breadboard("BroadBreadBoard", Unit::Inch, 6.6, 2.7, 63, [0.1, 0.1]).unwrap();
    let mut y = 0.1;
    y = board.add_outer_rows("ZY", 0.1, y).unwrap();
    y = board.add_inner_rows("JIHGF", 0.1, y, true, true).unwrap();
    y = board.add_outer_rows("XW", 0.1, y).unwrap();
    y = board.add_inner_rows("EDCBA", 0.1, y, true, true).unwrap();
    board.add_outer_rows("VU", 0.1, y).unwrap();
    board
        .set_bus_groups(vec![
            "ABCDE".chars().map(String::from).collect(),
            "FGHIJ".chars().map(String::from).collect(),
        ])
        .unwrap();

    let layout = board.breadboard_layout().unwrap();
    let outer: Vec<usize> = layout.outer_row_indices().collect();
    for i in 1..=63 {
        assert_eq!(outer.contains(&i), i % 6 != 0, "index {i}");
    }

    let catalog = board.catalog();
    assert!(catalog.find_pin("Z6").is_none());
    assert!(catalog.find_pin("Z7").is_some());
    assert!(catalog.find_pin("A6").is_some());
    assert_eq!(catalog.named_pins(RowSelection::Outer).count(), 6 * 53);
    assert_eq!(catalog.named_pins(RowSelection::Inner).count(), 10 * 63);

    let rec = board.reconcile().unwrap();
    assert!(rec.aliases.is_empty());
    // Six rails plus one bus per column for each row group.
    assert_eq!(rec.buses.len(), 6 + 2 * 63);
    assert_eq!(rec.buses[0], Bus::new("oU", catalog.row("U").unwrap().named_pins().filter_map(|p| p.name.clone()).collect()));
}

#[test]
fn free_function_accepts_extra_groups() {
    let board = gnd_board();
    let rec = reconcile(
        board.catalog(),
        &[Bus::new("sig", vec!["D2".into(), "GND".into()])],
    )
    .unwrap();
    assert_eq!(rec.buses.len(), 1);
    assert_eq!(rec.buses[0].members, ["D2", "GND", "GND-2"]);
}
