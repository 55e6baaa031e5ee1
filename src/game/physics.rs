//! Arcade physics: integration, drag, and collision resolution for
//! circle and axis-aligned rectangle bodies

use std::collections::HashMap;

use glam::Vec2;

use super::entity::EntityId;
use super::preset::BodyAttributes;

const EPSILON: f32 = 1e-4;

/// Collision shape, centered on the body position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_width: f32, half_height: f32 },
}

impl Shape {
    /// Radius of the smallest circle enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rect {
                half_width,
                half_height,
            } => half_width.hypot(half_height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Player,
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub shape: Shape,
    pub solid: bool,
    pub drag: f32,
    pub bounce: f32,
    pub mass: f32,
}

impl Body {
    pub fn player(position: Vec2, radius: f32) -> Self {
        Self {
            kind: BodyKind::Player,
            position,
            velocity: Vec2::ZERO,
            shape: Shape::Circle { radius },
            solid: true,
            drag: 0.0,
            bounce: 0.0,
            mass: 1.0,
        }
    }

    /// Body for a spawned object, at rest
    pub fn object(kind: BodyKind, position: Vec2, attrs: &BodyAttributes) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            shape: attrs.shape,
            solid: attrs.solid,
            drag: attrs.drag,
            bounce: attrs.bounce,
            mass: attrs.mass,
        }
    }

    fn is_mover(&self) -> bool {
        self.kind != BodyKind::Static
    }

    /// Movers collide as circles
    fn radius(&self) -> f32 {
        self.shape.bounding_radius()
    }

    fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }
}

/// Axis-aligned rectangle movers are kept inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

/// The simulation's own body store, keyed by the entity that owns each body
#[derive(Debug)]
pub struct PhysicsWorld {
    bodies: HashMap<EntityId, Body>,
    bounds: Bounds,
}

impl PhysicsWorld {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bodies: HashMap::new(),
            bounds,
        }
    }

    pub fn add_body(&mut self, id: EntityId, body: Body) {
        self.bodies.insert(id, body);
    }

    pub fn remove_body(&mut self, id: &EntityId) -> Option<Body> {
        self.bodies.remove(id)
    }

    #[cfg(test)]
    pub fn body(&self, id: &EntityId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (&EntityId, &Body)> {
        self.bodies.iter()
    }

    /// Returns false if no body is tracked for this id
    pub fn set_velocity(&mut self, id: &EntityId, velocity: Vec2) -> bool {
        match self.bodies.get_mut(id) {
            Some(body) => {
                body.velocity = velocity;
                true
            }
            None => false,
        }
    }

    /// Advance every mover by `dt` seconds and resolve contacts
    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            if !body.is_mover() {
                continue;
            }
            body.position += body.velocity * dt;
            if body.kind == BodyKind::Dynamic {
                apply_drag(body, dt);
            }
        }

        let mut movers: Vec<EntityId> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.is_mover())
            .map(|(id, _)| *id)
            .collect();
        movers.sort_unstable();

        let solids: Vec<Body> = self
            .bodies
            .values()
            .filter(|b| b.kind == BodyKind::Static && b.solid)
            .copied()
            .collect();

        // Mover-mover contacts
        for i in 0..movers.len() {
            for j in (i + 1)..movers.len() {
                let (Some(a), Some(b)) = (self.bodies.get(&movers[i]), self.bodies.get(&movers[j])) else {
                    continue;
                };
                if let Some((a, b)) = resolve_pair(*a, *b) {
                    self.bodies.insert(movers[i], a);
                    self.bodies.insert(movers[j], b);
                }
            }
        }

        // Mover-static contacts, then the perimeter
        for id in &movers {
            if let Some(body) = self.bodies.get_mut(id) {
                for solid in &solids {
                    resolve_static(body, solid);
                }
                clamp_to_bounds(body, &self.bounds);
            }
        }
    }
}

fn apply_drag(body: &mut Body, dt: f32) {
    if body.drag <= 0.0 {
        return;
    }
    let speed = body.velocity.length();
    let decel = body.drag * dt;
    if speed <= decel {
        body.velocity = Vec2::ZERO;
    } else {
        body.velocity -= body.velocity / speed * decel;
    }
}

/// Contact between a circle and another body.
/// Returns the normal pointing from `other` toward the circle, and the depth.
fn circle_contact(center: Vec2, radius: f32, other: &Body) -> Option<(Vec2, f32)> {
    match other.shape {
        Shape::Circle { radius: other_radius } => {
            let delta = center - other.position;
            let dist = delta.length();
            let depth = radius + other_radius - dist;
            if depth <= 0.0 {
                return None;
            }
            let normal = if dist > EPSILON { delta / dist } else { Vec2::X };
            Some((normal, depth))
        }
        Shape::Rect {
            half_width,
            half_height,
        } => {
            let half = Vec2::new(half_width, half_height);
            let closest = center.clamp(other.position - half, other.position + half);
            let delta = center - closest;
            let dist = delta.length();

            if dist > EPSILON {
                let depth = radius - dist;
                if depth <= 0.0 {
                    return None;
                }
                return Some((delta / dist, depth));
            }

            // Center is inside the rectangle: leave along the shallowest axis
            let local = center - other.position;
            let pen_x = half_width - local.x.abs();
            let pen_y = half_height - local.y.abs();
            if pen_x < pen_y {
                Some((Vec2::new(local.x.signum(), 0.0), pen_x + radius))
            } else {
                Some((Vec2::new(0.0, local.y.signum()), pen_y + radius))
            }
        }
    }
}

fn resolve_static(body: &mut Body, solid: &Body) {
    let Some((normal, depth)) = circle_contact(body.position, body.radius(), solid) else {
        return;
    };
    body.position += normal * depth;

    let approach = body.velocity.dot(normal);
    if approach < 0.0 {
        body.velocity -= normal * approach * (1.0 + body.bounce);
    }
}

fn resolve_pair(a: Body, b: Body) -> Option<(Body, Body)> {
    match (a.kind, b.kind) {
        (BodyKind::Player, BodyKind::Dynamic) => push_object(&a, b).map(|b| (a, b)),
        (BodyKind::Dynamic, BodyKind::Player) => push_object(&b, a).map(|a| (a, b)),
        (BodyKind::Dynamic, BodyKind::Dynamic) => exchange_impulse(a, b),
        _ => None,
    }
}

/// Player drives the object; the player itself is not slowed
fn push_object(player: &Body, mut object: Body) -> Option<Body> {
    if !object.solid {
        return None;
    }
    let (normal, depth) = circle_contact(object.position, object.radius(), player)?;
    object.position += normal * depth;

    let approach = (object.velocity - player.velocity).dot(normal);
    if approach < 0.0 {
        object.velocity -= normal * approach * (1.0 + object.bounce);
    }
    Some(object)
}

fn exchange_impulse(mut a: Body, mut b: Body) -> Option<(Body, Body)> {
    if !a.solid || !b.solid {
        return None;
    }
    let (normal, depth) = circle_contact(a.position, a.radius(), &Body {
        shape: Shape::Circle { radius: b.radius() },
        ..b
    })?;

    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let total = inv_a + inv_b;
    if total <= 0.0 {
        return None;
    }

    a.position += normal * depth * (inv_a / total);
    b.position -= normal * depth * (inv_b / total);

    let approach = (a.velocity - b.velocity).dot(normal);
    if approach < 0.0 {
        let restitution = a.bounce.min(b.bounce);
        let impulse = -(1.0 + restitution) * approach / total;
        a.velocity += normal * impulse * inv_a;
        b.velocity -= normal * impulse * inv_b;
    }
    Some((a, b))
}

fn clamp_to_bounds(body: &mut Body, bounds: &Bounds) {
    let radius = body.radius();
    let min = bounds.min + Vec2::splat(radius);
    let max = bounds.max - Vec2::splat(radius);
    if min.x > max.x || min.y > max.y {
        return;
    }

    if body.position.x < min.x {
        body.position.x = min.x;
        if body.velocity.x < 0.0 {
            body.velocity.x = -body.velocity.x * body.bounce;
        }
    } else if body.position.x > max.x {
        body.position.x = max.x;
        if body.velocity.x > 0.0 {
            body.velocity.x = -body.velocity.x * body.bounce;
        }
    }

    if body.position.y < min.y {
        body.position.y = min.y;
        if body.velocity.y < 0.0 {
            body.velocity.y = -body.velocity.y * body.bounce;
        }
    } else if body.position.y > max.y {
        body.position.y = max.y;
        if body.velocity.y > 0.0 {
            body.velocity.y = -body.velocity.y * body.bounce;
        }
    }
}
