//! Build engine record schemas: sectors, walls, sprites.
//!
//! These are the engine's own fixed layouts — 40, 32, and 44 bytes —
//! reproduced member for member. Each record embeds a 16-bit stat
//! bitfield as a nested schema and ends with the `tags` triple; slot 2
//! of the triple decides whether a game-specific extra record follows
//! (see [`super::xdata`]).

use std::sync::LazyLock;

use crate::codec::{Descriptor, Schema};

/// Engine sector record size in bytes
pub const SECTOR_SIZE: usize = 40;

/// Engine wall record size in bytes
pub const WALL_SIZE: usize = 32;

/// Engine sprite record size in bytes
pub const SPRITE_SIZE: usize = 44;

fn bit(parent_bits: u8) -> Descriptor {
	Descriptor::Partial {
		parent_bits,
		width: 1,
	}
}

/// Ceiling/floor surface stat word.
pub static SECTOR_STAT: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("SectorStat")
		.field("parallax", bit(16))
		.field("sloped", bit(16))
		.field("swap_xy", bit(16))
		.field("smoosh", bit(16))
		.field("x_flip", bit(16))
		.field("y_flip", bit(16))
		.field("align", bit(16))
		.field("masked", Descriptor::Partial { parent_bits: 16, width: 2 })
		.field("reserved", Descriptor::Partial { parent_bits: 16, width: 7 })
});

/// Wall stat word.
pub static WALL_STAT: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("WallStat")
		.field("blocking", bit(16))
		.field("bottom_swap", bit(16))
		.field("align", bit(16))
		.field("x_flip", bit(16))
		.field("masked", bit(16))
		.field("one_way", bit(16))
		.field("hitscan", bit(16))
		.field("translucent", bit(16))
		.field("y_flip", bit(16))
		.field("translucent_reverse", bit(16))
		.field("reserved", Descriptor::Partial { parent_bits: 16, width: 6 })
});

/// Sprite stat word.
pub static SPRITE_STAT: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("SpriteStat")
		.field("blocking", bit(16))
		.field("translucent", bit(16))
		.field("x_flip", bit(16))
		.field("y_flip", bit(16))
		.field("orientation", Descriptor::Partial { parent_bits: 16, width: 2 })
		.field("one_sided", bit(16))
		.field("centered", bit(16))
		.field("hitscan", bit(16))
		.field("translucent_reverse", bit(16))
		.field("reserved", Descriptor::Partial { parent_bits: 16, width: 5 })
		.field("invisible", bit(16))
});

/// The engine sector record (40 bytes).
pub static BUILD_SECTOR: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("BuildSector")
		.field("wall_start", Descriptor::I16)
		.field("wall_count", Descriptor::I16)
		.field("ceiling_z", Descriptor::I32)
		.field("floor_z", Descriptor::I32)
		.field("ceiling_stat", Descriptor::Nested(SECTOR_STAT.clone()))
		.field("floor_stat", Descriptor::Nested(SECTOR_STAT.clone()))
		.field("ceiling_picnum", Descriptor::I16)
		.field("ceiling_slope", Descriptor::I16)
		.field("ceiling_shade", Descriptor::I8)
		.field("ceiling_palette", Descriptor::U8)
		.field("ceiling_x_panning", Descriptor::U8)
		.field("ceiling_y_panning", Descriptor::U8)
		.field("floor_picnum", Descriptor::I16)
		.field("floor_slope", Descriptor::I16)
		.field("floor_shade", Descriptor::I8)
		.field("floor_palette", Descriptor::U8)
		.field("floor_x_panning", Descriptor::U8)
		.field("floor_y_panning", Descriptor::U8)
		.field("visibility", Descriptor::U8)
		.field("filler", Descriptor::U8)
		.field("tags", Descriptor::Array(Box::new(Descriptor::I16), 3))
});

/// The engine wall record (32 bytes).
pub static BUILD_WALL: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("BuildWall")
		.field("x", Descriptor::I32)
		.field("y", Descriptor::I32)
		.field("point2_index", Descriptor::I16)
		.field("other_side_wall_index", Descriptor::I16)
		.field("other_side_sector_index", Descriptor::I16)
		.field("stat", Descriptor::Nested(WALL_STAT.clone()))
		.field("picnum", Descriptor::I16)
		.field("masked_picnum", Descriptor::I16)
		.field("shade", Descriptor::I8)
		.field("palette", Descriptor::U8)
		.field("x_repeat", Descriptor::U8)
		.field("y_repeat", Descriptor::U8)
		.field("x_panning", Descriptor::U8)
		.field("y_panning", Descriptor::U8)
		.field("tags", Descriptor::Array(Box::new(Descriptor::I16), 3))
});

/// The engine sprite record (44 bytes).
pub static BUILD_SPRITE: LazyLock<Schema> = LazyLock::new(|| {
	Schema::new("BuildSprite")
		.field("x", Descriptor::I32)
		.field("y", Descriptor::I32)
		.field("z", Descriptor::I32)
		.field("stat", Descriptor::Nested(SPRITE_STAT.clone()))
		.field("picnum", Descriptor::I16)
		.field("shade", Descriptor::I8)
		.field("palette", Descriptor::U8)
		.field("clip_distance", Descriptor::U8)
		.field("filler", Descriptor::U8)
		.field("x_repeat", Descriptor::U8)
		.field("y_repeat", Descriptor::U8)
		.field("x_offset", Descriptor::I8)
		.field("y_offset", Descriptor::I8)
		.field("sector_index", Descriptor::I16)
		.field("status_index", Descriptor::I16)
		.field("angle", Descriptor::I16)
		.field("owner", Descriptor::I16)
		.field("x_velocity", Descriptor::I16)
		.field("y_velocity", Descriptor::I16)
		.field("z_velocity", Descriptor::I16)
		.field("tags", Descriptor::Array(Box::new(Descriptor::I16), 3))
});
