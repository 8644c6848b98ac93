
mod info;
mod station_update;
