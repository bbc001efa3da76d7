use comfy_table::{Table, presets::UTF8_FULL};
use courier_optimizer::json::plan::{JsonDispatchPlan, JsonRoute};

fn route_row(owner: &str, route: &JsonRoute) -> Vec<String> {
    let first_eta = route.stops.iter().filter_map(|stop| stop.eta).min();
    let last_eta = route.stops.iter().filter_map(|stop| stop.eta).max();

    vec![
        owner.to_owned(),
        route.pickup_address.clone(),
        route.pickup_window.to_string(),
        route.stops.len().to_string(),
        format!("{}/{}", route.demand, route.capacity),
        format_eta(first_eta),
        format_eta(last_eta),
    ]
}

fn format_eta(eta: Option<i64>) -> String {
    match eta {
        Some(seconds) => format!("{:02}:{:02}", seconds / 3_600, (seconds % 3_600) / 60),
        None => "-".to_owned(),
    }
}

pub fn routes_table(plan: &JsonDispatchPlan) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Vehicle",
        "Pickup",
        "Window",
        "Deliveries",
        "Load",
        "First ETA",
        "Last ETA",
    ]);

    for route in &plan.inhouse {
        table.add_row(route_row(&route.driver_id, &route.route));
    }

    for route in &plan.public {
        table.add_row(route_row("public", route));
    }

    table
}
