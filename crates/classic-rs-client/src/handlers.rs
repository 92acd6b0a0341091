//! Inbound classic packet handlers.

use std::time::Instant;

use bytes::Bytes;
use classic_rs_net::{ClientEvent, DispatchTable, Link, NetError};
use classic_rs_proto::codec::ProtoDecode;
use classic_rs_proto::packets::{
    id, size, ChatMessage, EntityTeleport, ExtEntry, ExtInfo, Handshake, HackControl, Kick,
    LevelDataChunk, LevelFinalise, SetBlock, SetPermission, TwoWayPing,
};
use classic_rs_proto::packets::handshake::USER_TYPE_OP;
use classic_rs_proto::types::packed_to_degrees;
use classic_rs_world::block_registry::{
    BLOCK_BEDROCK, BLOCK_CPE_COUNT, BLOCK_LAVA, BLOCK_ORIGINAL_COUNT, BLOCK_STILL_LAVA,
    BLOCK_STILL_WATER, BLOCK_WATER,
};
use tracing::{debug, info, warn};

use crate::game::{Game, MapDownload};

/// Name sent in our ExtInfo.
pub const APP_NAME: &str = concat!("classic-rs ", env!("CARGO_PKG_VERSION"));

/// Extensions this client implements.
pub const CLIENT_EXTENSIONS: &[(&str, i32)] = &[
    ("HackControl", 1),
    ("LongerMessages", 1),
    ("TwoWayPing", 1),
];

pub fn register(table: &mut DispatchTable<Game>) {
    table.set(id::HANDSHAKE, handshake, size::HANDSHAKE);
    table.set(id::PING, ping, size::PING);
    table.set(id::LEVEL_INIT, level_init, size::LEVEL_INIT);
    table.set(id::LEVEL_DATA_CHUNK, level_data_chunk, size::LEVEL_DATA_CHUNK);
    table.set(id::LEVEL_FINALISE, level_finalise, size::LEVEL_FINALISE);
    table.set(id::SET_BLOCK, set_block, size::SET_BLOCK);
    table.set(id::ADD_ENTITY, ignore, size::ADD_ENTITY);
    table.set(id::ENTITY_TELEPORT, entity_teleport, size::ENTITY_TELEPORT);
    table.set(id::RELPOS_AND_ORIENTATION, ignore, size::RELPOS_AND_ORIENTATION);
    table.set(id::RELPOS_UPDATE, ignore, size::RELPOS_UPDATE);
    table.set(id::ORIENTATION_UPDATE, ignore, size::ORIENTATION_UPDATE);
    table.set(id::REMOVE_ENTITY, ignore, size::REMOVE_ENTITY);
    table.set(id::MESSAGE, message, size::MESSAGE);
    table.set(id::KICK, kick, size::KICK);
    table.set(id::SET_PERMISSION, set_permission, size::SET_PERMISSION);
    table.set(id::EXT_INFO, ext_info, size::EXT_INFO);
    table.set(id::EXT_ENTRY, ext_entry, size::EXT_ENTRY);
    table.set(id::HACK_CONTROL, hack_control, size::HACK_CONTROL);
    table.set(id::TWO_WAY_PING, two_way_ping, size::TWO_WAY_PING);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

fn handshake(game: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let hs = Handshake::proto_decode(p)?;
    info!("Server: {} ({})", hs.server_name, hs.motd);
    game.server.name = hs.server_name;
    game.server.motd = hs.motd;
    let count = if game.use_cpe {
        BLOCK_CPE_COUNT
    } else {
        BLOCK_ORIGINAL_COUNT
    };
    game.level.blocks.allow_builtin(count);
    apply_user_type(game, link, hs.user_type);
    Ok(())
}

fn set_permission(game: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let perm = SetPermission::proto_decode(p)?;
    apply_user_type(game, link, perm.user_type);
    Ok(())
}

/// Operators may place and delete bedrock and liquids.
fn apply_user_type(game: &mut Game, link: &mut Link, user_type: u8) {
    let op = user_type == USER_TYPE_OP;
    game.server.is_op = op;
    for block in [
        BLOCK_BEDROCK,
        BLOCK_WATER,
        BLOCK_STILL_WATER,
        BLOCK_LAVA,
        BLOCK_STILL_LAVA,
    ] {
        game.level.blocks.set_permissions(block, op, op);
    }
    link.emit(ClientEvent::PermissionsChanged);
}

fn ping(_: &mut Game, _: &mut Link, _: &mut Bytes) -> Result<(), NetError> {
    Ok(())
}

fn ignore(_: &mut Game, _: &mut Link, _: &mut Bytes) -> Result<(), NetError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Map transfer
// ---------------------------------------------------------------------------

fn level_init(game: &mut Game, link: &mut Link, _: &mut Bytes) -> Result<(), NetError> {
    debug!("Map download started");
    game.download = Some(MapDownload::default());
    link.emit(ClientEvent::Loading(0.0));
    Ok(())
}

fn level_data_chunk(game: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let chunk = LevelDataChunk::proto_decode(p)?;
    let download = game.download.get_or_insert_with(MapDownload::default);
    download.compressed.extend_from_slice(chunk.payload());
    link.emit(ClientEvent::Loading(chunk.percent as f32 / 100.0));
    Ok(())
}

fn level_finalise(game: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let dims = LevelFinalise::proto_decode(p)?;
    let Some(download) = game.download.take() else {
        warn!("LevelFinalise without a map download");
        return Ok(());
    };
    let received = download.compressed.len();
    match download.finish(dims.width, dims.height, dims.length) {
        Ok(world) => {
            info!(
                width = dims.width,
                height = dims.height,
                length = dims.length,
                compressed = received,
                "Map downloaded"
            );
            game.set_downloaded_world(world);
            link.emit(ClientEvent::Loading(1.0));
        }
        Err(e) => {
            warn!("Failed to decode map: {e}");
            link.disconnect("Failed to load map", e.to_string());
        }
    }
    Ok(())
}

fn set_block(game: &mut Game, _: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let SetBlock { pos, block } = SetBlock::proto_decode(p)?;
    if game.download.is_none() {
        game.level
            .world
            .set(pos.x as i32, pos.y as i32, pos.z as i32, block);
    }
    Ok(())
}

fn entity_teleport(game: &mut Game, _: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let tp = EntityTeleport::proto_decode(p)?;
    if tp.is_self() {
        game.player.pos = tp.pos;
        game.player.yaw = packed_to_degrees(tp.yaw);
        game.player.pitch = packed_to_degrees(tp.pitch);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Chat and kicks
// ---------------------------------------------------------------------------

fn message(_: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let msg = ChatMessage::proto_decode(p)?;
    link.emit(ClientEvent::Chat(msg.text));
    Ok(())
}

fn kick(_: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let Kick { reason } = Kick::proto_decode(p)?;
    link.disconnect("&eLost connection to the server", reason);
    Ok(())
}

// ---------------------------------------------------------------------------
// Extensions
// ---------------------------------------------------------------------------

fn ext_info(game: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let info = ExtInfo::proto_decode(p)?;
    info!(
        "Server software: {} ({} extensions)",
        info.app_name, info.extension_count
    );
    if info.is_d3_server() {
        link.set_d3_fix(true);
    }
    game.server.app_name = info.app_name;
    game.server.extensions.clear();
    game.server.pending_extensions = info.extension_count;
    if info.extension_count == 0 {
        send_client_extensions(link)?;
    }
    Ok(())
}

fn ext_entry(game: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let entry = ExtEntry::proto_decode(p)?;
    debug!("Server extension {} v{}", entry.name, entry.version);

    if entry.name.eq_ignore_ascii_case("LongerMessages") {
        link.set_long_messages(true);
    } else if entry.name.eq_ignore_ascii_case("TwoWayPing") {
        game.server.two_way_ping = true;
    }
    game.server.extensions.push((entry.name, entry.version));

    if game.server.pending_extensions == 0 {
        return Ok(());
    }
    game.server.pending_extensions -= 1;
    if game.server.pending_extensions == 0 {
        send_client_extensions(link)?;
    }
    Ok(())
}

fn send_client_extensions(link: &mut Link) -> Result<(), NetError> {
    link.send(&ExtInfo {
        app_name: APP_NAME.to_owned(),
        extension_count: CLIENT_EXTENSIONS.len() as u16,
    })?;
    for (name, version) in CLIENT_EXTENSIONS {
        link.send(&ExtEntry {
            name: (*name).to_owned(),
            version: *version,
        })?;
    }
    Ok(())
}

fn hack_control(game: &mut Game, _: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let hacks = HackControl::proto_decode(p)?;
    game.player.jump_height = (hacks.jump_height >= 0).then(|| hacks.jump_height as f32 / 32.0);
    game.player.hacks = Some(hacks);
    Ok(())
}

fn two_way_ping(game: &mut Game, link: &mut Link, p: &mut Bytes) -> Result<(), NetError> {
    let ping = TwoWayPing::proto_decode(p)?;
    if ping.server_to_client {
        link.send(&ping)
    } else {
        game.ping.update(ping.data, Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::test_game;
    use bytes::{BufMut, BytesMut};
    use classic_rs_net::{event_channel, ConnectionState};
    use classic_rs_proto::codec::write_string;
    use classic_rs_proto::compression::gzip_writer;
    use std::io::Write;

    fn call(
        handler: classic_rs_net::Handler<Game>,
        game: &mut Game,
        link: &mut Link,
        payload: BytesMut,
    ) {
        handler(game, link, &mut payload.freeze()).unwrap();
    }

    #[test]
    fn every_handler_has_its_declared_size() {
        let mut table = DispatchTable::new();
        register(&mut table);
        assert_eq!(table.max_opcode(), Some(id::TWO_WAY_PING));
        assert_eq!(table.size(id::LEVEL_DATA_CHUNK), Some(1027));
        assert_eq!(table.size(id::ADD_ENTITY), Some(73));
        assert!(table.handler(id::KICK).is_some());
    }

    #[test]
    fn map_download_publishes_world() {
        let (tx, mut rx) = event_channel();
        let mut link = Link::new(tx);
        let mut game = test_game();

        let mut gz = gzip_writer(Vec::new());
        gz.write_all(&[0, 0, 0, 8]).unwrap();
        gz.write_all(&[3; 8]).unwrap();
        let compressed = gz.finish().unwrap();

        call(level_init, &mut game, &mut link, BytesMut::new());
        for (i, piece) in compressed.chunks(10).enumerate() {
            let mut chunk = BytesMut::new();
            chunk.put_u16(piece.len() as u16);
            chunk.put_slice(piece);
            chunk.put_bytes(0, 1024 - piece.len());
            chunk.put_u8((i * 10) as u8);
            call(level_data_chunk, &mut game, &mut link, chunk);
        }
        let mut fin = BytesMut::new();
        fin.put_u16(2);
        fin.put_u16(2);
        fin.put_u16(2);
        call(level_finalise, &mut game, &mut link, fin);

        assert!(game.download.is_none());
        assert_eq!(game.level.world.blocks(), &[3; 8]);
        let mut last = None;
        while let Ok(e) = rx.try_recv() {
            last = Some(e);
        }
        assert_eq!(last, Some(ClientEvent::Loading(1.0)));
    }

    #[test]
    fn corrupt_map_disconnects() {
        let (tx, _rx) = event_channel();
        let mut link = Link::new(tx);
        let mut game = test_game();
        game.download = Some(MapDownload {
            compressed: vec![1, 2, 3],
        });
        let mut fin = BytesMut::new();
        fin.put_bytes(0, 6);
        call(level_finalise, &mut game, &mut link, fin);
        assert!(game.download.is_none());
        assert_eq!(link.state(), ConnectionState::Disconnected);
        assert!(!game.has_world());
    }

    #[test]
    fn op_may_break_bedrock() {
        let (tx, _rx) = event_channel();
        let mut link = Link::new(tx);
        let mut game = test_game();

        let mut hs = BytesMut::new();
        hs.put_u8(7);
        write_string(&mut hs, "Server");
        write_string(&mut hs, "Welcome");
        hs.put_u8(USER_TYPE_OP);
        call(handshake, &mut game, &mut link, hs);
        assert!(game.server.is_op);
        assert!(game.level.blocks.can_delete(BLOCK_BEDROCK));
        assert!(game.level.blocks.can_place(1));
        assert!(game.level.blocks.can_place(65));

        let mut perm = BytesMut::new();
        perm.put_u8(0);
        call(set_permission, &mut game, &mut link, perm);
        assert!(!game.level.blocks.can_delete(BLOCK_BEDROCK));
        assert!(!game.level.blocks.can_place(BLOCK_STILL_LAVA));
    }

    #[test]
    fn d3_ext_info_enables_workaround() {
        let (tx, _rx) = event_channel();
        let mut link = Link::new(tx);
        let mut game = test_game();
        let mut info = BytesMut::new();
        write_string(&mut info, "D3 server 1.2");
        info.put_u16(1);
        call(ext_info, &mut game, &mut link, info);
        assert!(link.d3_fix());
        assert_eq!(game.server.pending_extensions, 1);

        let mut entry = BytesMut::new();
        write_string(&mut entry, "LongerMessages");
        entry.put_i32(1);
        call(ext_entry, &mut game, &mut link, entry);
        assert!(link.long_messages());
        assert!(game.server.supports("longermessages"));
        assert_eq!(game.server.pending_extensions, 0);
    }

    #[test]
    fn hack_control_jump_height() {
        let (tx, _rx) = event_channel();
        let mut link = Link::new(tx);
        let mut game = test_game();
        let raw = BytesMut::from(&[1u8, 1, 1, 1, 1, 0, 64][..]);
        call(hack_control, &mut game, &mut link, raw);
        assert_eq!(game.player.jump_height, Some(2.0));

        let raw = BytesMut::from(&[0u8, 0, 0, 0, 0, 0xFF, 0xFF][..]);
        call(hack_control, &mut game, &mut link, raw);
        assert_eq!(game.player.jump_height, None);
        assert!(!game.player.hacks.unwrap().flying);
    }

    #[test]
    fn pong_updates_ping_list() {
        let (tx, _rx) = event_channel();
        let mut link = Link::new(tx);
        let mut game = test_game();
        let sent = Instant::now() - std::time::Duration::from_millis(200);
        let data = game.ping.next_ping_data(sent);

        let mut pong = BytesMut::new();
        pong.put_u8(0);
        pong.put_u16(data);
        call(two_way_ping, &mut game, &mut link, pong);
        assert!(game.ping.average_ms() >= 100);
    }

    #[test]
    fn chat_line_is_emitted() {
        let (tx, mut rx) = event_channel();
        let mut link = Link::new(tx);
        let mut game = test_game();
        let mut msg = BytesMut::new();
        msg.put_u8(0);
        write_string(&mut msg, "&ehello");
        call(message, &mut game, &mut link, msg);
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::Chat("&ehello".into()));
    }
}
