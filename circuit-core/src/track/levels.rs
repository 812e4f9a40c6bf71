use glam::DVec2;

use super::{Direction, Track};

pub type LevelNumber = u32;

pub const TOTAL_LEVELS: LevelNumber = 5;

const SPEEDWAY_OVAL: [(f64, f64); 8] = [
    (200.0, 150.0), // start/finish
    (400.0, 100.0),
    (600.0, 150.0),
    (700.0, 300.0),
    (650.0, 450.0),
    (400.0, 500.0),
    (150.0, 450.0),
    (100.0, 300.0),
];

const FIGURE_EIGHT: [(f64, f64); 8] = [
    (250.0, 200.0),
    (400.0, 150.0),
    (550.0, 200.0),
    (500.0, 300.0), // right crossover
    (550.0, 400.0),
    (400.0, 450.0),
    (250.0, 400.0),
    (300.0, 300.0), // left crossover
];

const TECHNICAL_CIRCUIT: [(f64, f64); 15] = [
    (650.0, 100.0),
    (550.0, 120.0),
    (480.0, 180.0),
    (400.0, 150.0),
    (320.0, 200.0),
    (200.0, 250.0),
    (120.0, 350.0),
    (150.0, 450.0),
    (250.0, 500.0),
    (400.0, 480.0),
    (450.0, 420.0),
    (500.0, 380.0),
    (600.0, 400.0),
    (700.0, 350.0),
    (720.0, 200.0),
];

const GRAND_PRIX_CIRCUIT: [(f64, f64); 16] = [
    (620.0, 80.0),
    (500.0, 60.0),
    (350.0, 80.0), // hairpin
    (250.0, 150.0),
    (200.0, 250.0),
    (180.0, 350.0),
    (220.0, 420.0),
    (350.0, 450.0),
    (500.0, 420.0), // chicane
    (520.0, 360.0),
    (480.0, 320.0),
    (400.0, 280.0),
    (300.0, 250.0),
    (250.0, 180.0),
    (300.0, 120.0),
    (450.0, 100.0),
];

const CHAMPIONSHIP_CIRCUIT: [(f64, f64); 21] = [
    (700.0, 80.0),
    (580.0, 60.0),
    (450.0, 80.0),
    (350.0, 120.0),
    (280.0, 180.0),
    (250.0, 260.0),
    (150.0, 320.0),
    (100.0, 400.0),
    (150.0, 480.0),
    (300.0, 520.0),
    (350.0, 480.0),
    (400.0, 440.0),
    (500.0, 460.0),
    (600.0, 420.0),
    (650.0, 350.0),
    (620.0, 280.0),
    (550.0, 220.0),
    (480.0, 250.0),
    (420.0, 200.0),
    (500.0, 150.0),
    (600.0, 120.0),
];

fn circuit(name: &str, points: &[(f64, f64)], width: f64) -> Track {
    Track {
        name: name.to_string(),
        waypoints: points.iter().map(|&(x, y)| DVec2::new(x, y)).collect(),
        width,
        closed: true,
        direction: Direction::Clockwise,
    }
}

/// The compiled-in track for a level in `1..=TOTAL_LEVELS`, or `None` past
/// either end of the campaign.
pub fn level_track(level: LevelNumber) -> Option<Track> {
    let track = match level {
        1 => circuit("Speedway Oval", &SPEEDWAY_OVAL, 80.0),
        2 => circuit("Figure Eight", &FIGURE_EIGHT, 65.0),
        3 => circuit("Technical Circuit", &TECHNICAL_CIRCUIT, 60.0),
        4 => circuit("Grand Prix Circuit", &GRAND_PRIX_CIRCUIT, 55.0),
        5 => circuit("Championship Circuit", &CHAMPIONSHIP_CIRCUIT, 50.0),
        _ => return None,
    };
    Some(track)
}
