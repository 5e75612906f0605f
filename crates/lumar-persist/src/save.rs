use lumar_world::WorldSnapshot;

use crate::format::*;

/// Serialize a world snapshot into the Lumar save binary format.
///
/// Layout: header (56B) + observer entries (84B × N), ordered by observer id.
pub fn save(snapshot: &WorldSnapshot) -> Vec<u8> {
    let seethe = snapshot.seethe;
    let header = SaveHeader {
        magic: MAGIC,
        version: FORMAT_VERSION,
        _pad0: 0,
        world_seed: snapshot.world_seed,
        step_count: snapshot.step_count,
        seethe_draws: seethe.draws,
        seethe_steps_remaining: seethe.state.cycle_steps_remaining,
        seethe_cycles_until_long_inactive: seethe.state.cycles_until_long_inactive,
        seethe_active: seethe.state.is_active as u32,
        observer_count: snapshot.observers.len() as u32,
        grid_spacing: snapshot.grid_spacing,
        _pad1: 0,
    };

    let total_size = HEADER_SIZE + snapshot.observers.len() * OBSERVER_ENTRY_SIZE;
    let mut output = Vec::with_capacity(total_size);
    output.extend_from_slice(bytemuck::bytes_of(&header));

    let mut observers: Vec<_> = snapshot.observers.iter().collect();
    observers.sort_by_key(|(id, _)| *id);
    for (id, known) in observers {
        write_observer(&mut output, *id, known);
    }

    log::debug!(
        "Saved world at step {} ({} observers, {} bytes)",
        snapshot.step_count,
        snapshot.observers.len(),
        output.len()
    );
    output
}
