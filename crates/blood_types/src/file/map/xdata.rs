//! Game-specific extra-data record schemas.
//!
//! Sectors, walls, and sprites whose `tags[2]` slot is positive carry a
//! dense bit-packed data record holding the trigger wiring, keys, and
//! motion parameters the game layers over the engine records. The
//! records are 60, 24, and 56 bytes; every partial group packs LSB-first
//! into a whole underlying integer.

use std::sync::LazyLock;

use crate::codec::{Descriptor, Schema};

/// Sector extra record size in bytes
pub const SECTOR_DATA_SIZE: usize = 60;

/// Wall extra record size in bytes
pub const WALL_DATA_SIZE: usize = 24;

/// Sprite extra record size in bytes
pub const SPRITE_DATA_SIZE: usize = 56;

fn bit(parent_bits: u8) -> Descriptor {
	Descriptor::Partial {
		parent_bits,
		width: 1,
	}
}

fn part(parent_bits: u8, width: u8) -> Descriptor {
	Descriptor::Partial {
		parent_bits,
		width,
	}
}

/// Sector extra data: trigger wiring, lighting waves, motion and wind
/// parameters (60 bytes).
pub static BLOOD_SECTOR_DATA: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("BloodSectorData")
		.field("reference", part(32, 14))
		.field("state", bit(32))
		.field("busy", part(32, 17))
		.field("data", Descriptor::U16)
		.field("tx_id", part(16, 10))
		.field("wave", part(16, 4))
		.field("shade_always", bit(16))
		.field("shade_floor", bit(16))
		.field("rx_id", part(16, 10))
		.field("shade_ceiling", bit(16))
		.field("shade_walls", bit(16))
		.field("trigger_on", bit(16))
		.field("trigger_off", bit(16))
		.field("rest_state", bit(16))
		.field("interruptable", bit(16))
		.field("command", Descriptor::U8)
		.field("off_busy_time", part(16, 12))
		.field("off_busy_wave", part(16, 2))
		.field("on_busy_wave", part(16, 2))
		.field("off_wait_time", part(16, 12))
		.field("re_trigger_a", bit(16))
		.field("re_trigger_b", bit(16))
		.field("send_at_on", bit(16))
		.field("send_at_off", bit(16))
		.field("on_busy_time", part(16, 12))
		.field("decoupled", bit(16))
		.field("trigger_once", bit(16))
		.field("is_triggered", bit(16))
		.field("locked", bit(16))
		.field("on_wait_time", part(16, 12))
		.field("push", bit(16))
		.field("vector", bit(16))
		.field("reserved_0", part(16, 2))
		.field("amplitude", Descriptor::I8)
		.field("frequency", Descriptor::U8)
		.field("phase", Descriptor::U8)
		.field("trigger_push", bit(8))
		.field("trigger_impact", bit(8))
		.field("trigger_explode", bit(8))
		.field("trigger_enter", bit(8))
		.field("trigger_exit", bit(8))
		.field("trigger_wall_push", bit(8))
		.field("color", bit(8))
		.field("reserved_1", bit(8))
		.field("shade", Descriptor::I8)
		.field("pan_always", bit(8))
		.field("pan_floor", bit(8))
		.field("pan_ceiling", bit(8))
		.field("drag", bit(8))
		.field("underwater", bit(8))
		.field("depth", part(8, 2))
		.field("reserved_2", bit(8))
		.field("pan_velocity", Descriptor::U8)
		.field("pan_angle", Descriptor::U8)
		.field("wind_always", bit(8))
		.field("damage_type", part(8, 3))
		.field("reserved_3", part(8, 4))
		.field("wind_velocity", Descriptor::U16)
		.field("wind_angle", Descriptor::U16)
		.field("bob_theta", Descriptor::U16)
		.field("bob_speed", Descriptor::I8)
		.field("bob_always", bit(8))
		.field("bob_floor", bit(8))
		.field("bob_ceiling", bit(8))
		.field("crush", bit(8))
		.field("reserved_4", part(8, 4))
		.field("off_ceiling_z", Descriptor::I32)
		.field("on_ceiling_z", Descriptor::I32)
		.field("off_floor_z", Descriptor::I32)
		.field("on_floor_z", Descriptor::I32)
		.field("ceiling_palette", Descriptor::U8)
		.field("floor_palette", Descriptor::U8)
		.field("key", Descriptor::U8)
		.field("reserved_5", Descriptor::Bytes(5))
});

/// Wall extra data: trigger wiring and panning (24 bytes).
pub static BLOOD_WALL_DATA: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("BloodWallData")
		.field("reference", part(32, 14))
		.field("state", bit(32))
		.field("busy", part(32, 17))
		.field("data", Descriptor::I16)
		.field("tx_id", part(16, 10))
		.field("reserved_0", part(16, 6))
		.field("rx_id", part(16, 10))
		.field("trigger_on", bit(16))
		.field("trigger_off", bit(16))
		.field("trigger_once", bit(16))
		.field("is_triggered", bit(16))
		.field("decoupled", bit(16))
		.field("locked", bit(16))
		.field("command", Descriptor::U8)
		.field("pan_always", bit(8))
		.field("interruptable", bit(8))
		.field("dude_lockout", bit(8))
		.field("re_trigger_a", bit(8))
		.field("re_trigger_b", bit(8))
		.field("send_at_on", bit(8))
		.field("send_at_off", bit(8))
		.field("reserved_1", bit(8))
		.field("pan_x_velocity", Descriptor::I8)
		.field("pan_y_velocity", Descriptor::I8)
		.field("busy_time", Descriptor::U8)
		.field("wait_time", Descriptor::U8)
		.field("key", Descriptor::U8)
		.field("reserved_2", Descriptor::Bytes(7))
});

/// Sprite extra data: trigger wiring, dude behaviour, burn and target
/// state (56 bytes).
pub static BLOOD_SPRITE_DATA: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("BloodSpriteData")
		.field("reference", part(32, 14))
		.field("state", bit(32))
		.field("busy", part(32, 17))
		.field("tx_id", part(16, 10))
		.field("reserved_0", part(16, 6))
		.field("rx_id", part(16, 10))
		.field("trigger_on", bit(16))
		.field("trigger_off", bit(16))
		.field("trigger_once", bit(16))
		.field("restore", bit(16))
		.field("decoupled", bit(16))
		.field("locked", bit(16))
		.field("command", Descriptor::U8)
		.field("trigger_push", bit(8))
		.field("trigger_vector", bit(8))
		.field("trigger_impact", bit(8))
		.field("trigger_pickup", bit(8))
		.field("trigger_touch", bit(8))
		.field("trigger_sight", bit(8))
		.field("trigger_proximity", bit(8))
		.field("reserved_1", bit(8))
		.field("busy_time", Descriptor::U16)
		.field("wait_time", Descriptor::U16)
		.field("data_1", Descriptor::I16)
		.field("data_2", Descriptor::I16)
		.field("data_3", Descriptor::I16)
		.field("data_4", Descriptor::U16)
		.field("key", Descriptor::U8)
		.field("dude_lockout", bit(8))
		.field("dude_deaf", bit(8))
		.field("dude_ambush", bit(8))
		.field("dude_guard", bit(8))
		.field("dude_flag_4", bit(8))
		.field("reserved_2", part(8, 3))
		.field("wave", part(8, 2))
		.field("interruptable", bit(8))
		.field("launch_mode", part(8, 2))
		.field("reserved_3", part(8, 3))
		.field("drop_item", Descriptor::U8)
		.field("respawn", Descriptor::U8)
		.field("target_index", Descriptor::I16)
		.field("target_x", Descriptor::I32)
		.field("target_y", Descriptor::I32)
		.field("target_z", Descriptor::I32)
		.field("burn_time", Descriptor::U16)
		.field("burn_source", Descriptor::I16)
		.field("height", Descriptor::U16)
		.field("state_timer", Descriptor::U16)
		.field("respawn_pending", part(8, 2))
		.field("reserved_4", part(8, 6))
		.field("reserved_5", Descriptor::Bytes(6))
});
