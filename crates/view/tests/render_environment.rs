use glam::Vec2;
use view::environment::{CartLayout, CliffLayout, GridLayout, HillLayout};
use view::scene::{bin_position, hill_height, palette, track_x};
use view::{
    render_environment, Cell, DrawCommand, EnvironmentDescriptor, Layout, RecordingSurface,
    StateValue, Surface,
};

fn gridworld() -> GridLayout {
    GridLayout {
        size: 5,
        obstacles: vec![Cell::new(1, 1), Cell::new(2, 3)],
        holes: Vec::new(),
        goal: Some(Cell::new(4, 4)),
    }
}

fn without_agent(commands: &[DrawCommand]) -> Vec<DrawCommand> {
    commands
        .iter()
        .filter(|cmd| !matches!(cmd, DrawCommand::Arc { .. }))
        .cloned()
        .collect()
}

#[test]
fn nothing_is_drawn_before_init() {
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(None, &mut surface);
    assert!(surface.is_blank());
    assert_eq!(surface.clear_count(), 0);
}

#[test]
fn grid_world_draws_tiles_obstacles_goal_and_agent() {
    let env = EnvironmentDescriptor::new(Layout::GridWorld(gridworld()))
        .with_state(StateValue::Cell(Cell::new(0, 0)));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(Some(&env), &mut surface);

    assert_eq!(surface.filled_with(palette::OBSTACLE).len(), 2);
    assert_eq!(surface.filled_with(palette::GOAL).len(), 1);
    assert_eq!(surface.texts().collect::<Vec<_>>(), ["G"]);
    assert_eq!(surface.arc_centers(), [Vec2::new(40.0, 40.0)]);
}

#[test]
fn moving_the_agent_leaves_the_layout_unchanged() {
    let mut env = EnvironmentDescriptor::new(Layout::GridWorld(gridworld()))
        .with_state(StateValue::Cell(Cell::new(2, 2)));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(Some(&env), &mut surface);
    let before = without_agent(surface.commands());

    // Up from (2, 2).
    env.state = Some(StateValue::Cell(Cell::new(1, 2)));
    render_environment(Some(&env), &mut surface);

    assert_eq!(without_agent(surface.commands()), before);
    assert_eq!(surface.arc_centers(), [Vec2::new(200.0, 120.0)]);
    assert_eq!(surface.clear_count(), 2);
}

#[test]
fn frozen_lake_marks_holes() {
    let lake = GridLayout {
        size: 4,
        obstacles: Vec::new(),
        holes: vec![Cell::new(1, 1), Cell::new(1, 3), Cell::new(2, 3), Cell::new(3, 0)],
        goal: Some(Cell::new(3, 3)),
    };
    let env = EnvironmentDescriptor::new(Layout::FrozenLake(lake))
        .with_state(StateValue::Cell(Cell::new(0, 0)));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(Some(&env), &mut surface);

    assert_eq!(surface.filled_with(palette::HOLE).len(), 4);
    let holes = surface.texts().filter(|t| *t == "H").count();
    assert_eq!(holes, 4);
}

#[test]
fn cliff_walking_uses_its_own_grid() {
    let cliff = CliffLayout {
        cliff: (1..11).map(|col| Cell::new(3, col)).collect(),
        start: Some(Cell::new(3, 0)),
        goal: Some(Cell::new(3, 11)),
        ..CliffLayout::default()
    };
    let env = EnvironmentDescriptor::new(Layout::CliffWalking(cliff))
        .with_state(StateValue::Cell(Cell::new(3, 0)));
    let mut surface = RecordingSurface::new(480.0, 160.0);
    render_environment(Some(&env), &mut surface);

    assert_eq!(surface.filled_with(palette::CLIFF).len(), 10);
    assert_eq!(surface.texts().collect::<Vec<_>>(), ["S", "G"]);
    assert_eq!(surface.arc_centers(), [Vec2::new(20.0, 140.0)]);
}

#[test]
fn agent_outside_the_grid_is_skipped() {
    let env = EnvironmentDescriptor::new(Layout::GridWorld(gridworld()))
        .with_state(StateValue::Cell(Cell::new(9, 9)));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(Some(&env), &mut surface);
    assert!(surface.arc_centers().is_empty());
    assert!(!surface.is_blank());
}

#[test]
fn mountain_car_sits_on_the_hill() {
    let env = EnvironmentDescriptor::new(Layout::MountainCar(HillLayout::default()))
        .with_state(StateValue::Bins(vec![19, 10]));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(Some(&env), &mut surface);

    let position = bin_position(19, 20);
    let expected = Vec2::new(track_x(position, 400.0), hill_height(position, surface.size()));
    let car = surface.filled_with(palette::AGENT);
    assert_eq!(car.len(), 1);
    assert!((car[0].center().x - expected.x).abs() < 1e-3);
    assert!(car[0].y < expected.y);
}

#[test]
fn centered_cart_pole_stands_upright() {
    let env = EnvironmentDescriptor::new(Layout::CartPole(CartLayout::default()))
        .with_state(StateValue::Bins(vec![5, 5, 5, 5]));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(Some(&env), &mut surface);

    let cart = surface.filled_with(palette::CART);
    assert_eq!(cart.len(), 1);
    assert!((cart[0].center().x - 200.0).abs() < 1e-3);

    let pole = surface.lines();
    assert_eq!(pole.len(), 1);
    let [base, tip] = pole[0] else {
        panic!("pole should be a single segment");
    };
    assert!((base.x - tip.x).abs() < 1e-3);
    assert!(tip.y < base.y);
}

#[test]
fn cart_pole_leans_with_the_angle_bin() {
    let env = EnvironmentDescriptor::new(Layout::CartPole(CartLayout::default()))
        .with_state(StateValue::Bins(vec![6, 5, 8, 5]));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(Some(&env), &mut surface);

    let cart = surface.filled_with(palette::CART);
    assert!((cart[0].center().x - 230.0).abs() < 1e-3);
    let pole = surface.lines();
    let [base, tip] = pole[0] else {
        panic!("pole should be a single segment");
    };
    assert!(tip.x > base.x);
}

#[test]
fn layouts_without_a_state_draw_no_agent() {
    let mut surface = RecordingSurface::new(400.0, 400.0);

    let grid = EnvironmentDescriptor::new(Layout::GridWorld(gridworld()));
    render_environment(Some(&grid), &mut surface);
    assert_eq!(surface.filled_with(palette::FLOOR).len(), 25);
    assert_eq!(surface.filled_with(palette::OBSTACLE).len(), 2);
    assert!(surface.arc_centers().is_empty());
    assert!(surface.filled_with(palette::AGENT).is_empty());

    let hill = EnvironmentDescriptor::new(Layout::MountainCar(HillLayout::default()));
    render_environment(Some(&hill), &mut surface);
    assert!(!surface.filled_with(palette::HILL).is_empty());
    assert_eq!(surface.lines().len(), 2, "ridge and goal flag");
    assert!(surface.filled_with(palette::AGENT).is_empty());
    assert!(surface.arc_centers().is_empty());

    let cart = EnvironmentDescriptor::new(Layout::CartPole(CartLayout::default()));
    render_environment(Some(&cart), &mut surface);
    assert_eq!(surface.filled_with(palette::GROUND).len(), 1);
    assert!(surface.filled_with(palette::CART).is_empty());
    assert!(surface.lines().is_empty());
    assert!(surface.arc_centers().is_empty());
}

#[test]
fn extreme_cart_bins_do_not_overflow() {
    let env = EnvironmentDescriptor::new(Layout::CartPole(CartLayout::default()))
        .with_state(StateValue::Bins(vec![i64::MIN, 0, i64::MAX, 0]));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    render_environment(Some(&env), &mut surface);

    assert_eq!(surface.filled_with(palette::CART).len(), 1);
    assert_eq!(surface.lines().len(), 1);
}
