pub mod datasets;
pub mod road_health;
