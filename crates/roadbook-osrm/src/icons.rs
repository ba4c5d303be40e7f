//! Maneuver icon names and instruction text derived from OSRM maneuvers.

/// Icon name and human-readable instruction for an OSRM maneuver.
pub fn describe(maneuver_type: &str, modifier: Option<&str>, road_name: &str) -> (String, String) {
    let icon = icon_name(maneuver_type, modifier);
    let text = instruction(maneuver_type, modifier, road_name);
    (icon, text)
}

/// Icon name for an OSRM maneuver type/modifier pair.
pub fn icon_name(maneuver_type: &str, modifier: Option<&str>) -> String {
    let icon = match maneuver_type {
        "depart" => "depart",
        "arrive" => "arrive",
        "roundabout" | "rotary" => "roundabout-enter",
        "exit roundabout" | "exit rotary" => "roundabout-exit",
        "merge" => match modifier {
            Some("left") | Some("slight left") => "merge-left",
            _ => "merge-right",
        },
        "on ramp" => "ramp-on",
        "off ramp" => "ramp-off",
        _ => match modifier {
            Some("sharp right") => "turn-sharp-right",
            Some("right") => "turn-right",
            Some("slight right") => "turn-slight-right",
            Some("sharp left") => "turn-sharp-left",
            Some("left") => "turn-left",
            Some("slight left") => "turn-slight-left",
            Some("uturn") => "turn-uturn",
            Some("straight") => "continue-straight",
            _ => "continue",
        },
    };
    icon.to_string()
}

fn instruction(maneuver_type: &str, modifier: Option<&str>, road_name: &str) -> String {
    let action = match maneuver_type {
        "depart" => "Depart".to_string(),
        "arrive" => "Arrive at your destination".to_string(),
        "roundabout" | "rotary" => "Enter the roundabout".to_string(),
        "exit roundabout" | "exit rotary" => "Exit the roundabout".to_string(),
        "merge" => "Merge".to_string(),
        "on ramp" => "Take the ramp".to_string(),
        "off ramp" => "Take the exit".to_string(),
        _ => match modifier {
            Some("uturn") => "Make a U-turn".to_string(),
            Some("straight") => "Continue straight".to_string(),
            Some(direction) => {
                let mut action = String::from("Turn ");
                action.push_str(direction);
                action
            }
            None => "Continue".to_string(),
        },
    };

    if road_name.is_empty() || maneuver_type == "arrive" {
        action
    } else {
        format!("{action} onto {road_name}")
    }
}
