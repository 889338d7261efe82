// Copyright 2025 Content Filter Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Native Descriptor Tests
//!
//! Runs the filter against the native descriptor flavor: accessor tables
//! over concrete Rust structs, as a message code generator would emit.

use std::sync::Arc;

use content_filter::api::{ContentFilter, Payload};
use content_filter::core::TypeTag;
use content_filter::introspect::{FieldRef, NativeMember, NativeMembers, TypeSupport};

struct Position {
    x: f64,
    y: f64,
}

struct Robot {
    id: u32,
    name: String,
    position: Position,
    sensors: Vec<i32>,
}

fn position_type_support() -> Arc<TypeSupport> {
    TypeSupport::native(NativeMembers::new(vec![
        NativeMember::new(
            "x",
            TypeTag::Float64,
            Box::new(|base, _| {
                base.downcast_ref::<Position>()
                    .map(|p| FieldRef::Float(p.x))
            }),
        ),
        NativeMember::new(
            "y",
            TypeTag::Float64,
            Box::new(|base, _| {
                base.downcast_ref::<Position>()
                    .map(|p| FieldRef::Float(p.y))
            }),
        ),
    ]))
}

fn robot_type_support() -> Arc<TypeSupport> {
    TypeSupport::native(NativeMembers::new(vec![
        NativeMember::new(
            "id",
            TypeTag::Uint32,
            Box::new(|base, _| {
                base.downcast_ref::<Robot>()
                    .map(|r| FieldRef::Unsigned(r.id as u64))
            }),
        ),
        NativeMember::new(
            "name",
            TypeTag::String,
            Box::new(|base, _| {
                base.downcast_ref::<Robot>()
                    .map(|r| FieldRef::Str(r.name.as_str()))
            }),
        ),
        NativeMember::new(
            "position",
            TypeTag::Message,
            Box::new(|base, _| {
                base.downcast_ref::<Robot>()
                    .map(|r| FieldRef::Message(&r.position))
            }),
        )
        .with_nested(position_type_support()),
        NativeMember::new(
            "sensors",
            TypeTag::Int32,
            Box::new(|base, index| {
                let robot = base.downcast_ref::<Robot>()?;
                robot
                    .sensors
                    .get(index?)
                    .map(|v| FieldRef::Signed(*v as i64))
            }),
        )
        .with_sequence(Box::new(|base| {
            base.downcast_ref::<Robot>().map(|r| r.sensors.len())
        })),
    ]))
}

fn sample_robot() -> Robot {
    Robot {
        id: 7,
        name: "rover".to_string(),
        position: Position { x: 1.5, y: -2.0 },
        sensors: vec![10, 20],
    }
}

#[test]
fn test_native_scalar_comparison() {
    let filter = ContentFilter::new(robot_type_support());
    filter.set(Some("id = 7"), &[]).unwrap();

    let robot = sample_robot();
    assert!(filter.evaluate(Payload::Message(&robot)));

    let other = Robot {
        id: 8,
        ..sample_robot()
    };
    assert!(!filter.evaluate(Payload::Message(&other)));
}

#[test]
fn test_native_nested_field() {
    let filter = ContentFilter::new(robot_type_support());
    filter.set(Some("position.x > 1.0 AND position.y < 0.0"), &[]).unwrap();

    let robot = sample_robot();
    assert!(filter.evaluate(Payload::Message(&robot)));
}

#[test]
fn test_native_sequence_bounds() {
    let filter = ContentFilter::new(robot_type_support());
    filter.set(Some("sensors[1] = 20"), &[]).unwrap();

    let robot = sample_robot();
    assert!(filter.evaluate(Payload::Message(&robot)));

    // Index beyond the runtime length rejects the payload.
    let filter = ContentFilter::new(robot_type_support());
    filter.set(Some("sensors[5] = 20"), &[]).unwrap();
    assert!(!filter.evaluate(Payload::Message(&robot)));
}

#[test]
fn test_native_like_on_string_field() {
    let filter = ContentFilter::new(robot_type_support());
    filter
        .set(Some("name LIKE %0"), &["'ro%'".to_string()])
        .unwrap();

    let robot = sample_robot();
    assert!(filter.evaluate(Payload::Message(&robot)));

    let other = Robot {
        name: "crawler".to_string(),
        ..sample_robot()
    };
    assert!(!filter.evaluate(Payload::Message(&other)));
}

#[test]
fn test_native_wrong_payload_type_rejected() {
    let filter = ContentFilter::new(robot_type_support());
    filter.set(Some("id = 7"), &[]).unwrap();

    let position = Position { x: 0.0, y: 0.0 };
    assert!(!filter.evaluate(Payload::Message(&position)));
}
