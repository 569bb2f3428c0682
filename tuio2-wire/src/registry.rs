//! The parser registry: one entry per catalogue path, each translating a
//! decoded [`Record`] into zero or more [`Message`]s, plus the inverse
//! `imprint` direction. Dispatch is a plain `match` on the path string —
//! the catalogue is closed, so there is no dynamic registration.

use tuio2_types::contact::{OutputMode, Position};
use tuio2_types::coords::{Point2, Point3, Velocity3};
use tuio2_types::ids::{ComponentId, FrameId, SessionId, TuId, TypeId, UserId, Uuid128};
use tuio2_types::message::{
    component_of, output_mode_of, type_user_of, AliveSetMessage, AreaGeometryMessage,
    BoundsMessage, DiscSpan, FrameMessage, GroupMessage, LinkAssociationMessage,
    ListAssociationMessage, Message, NeighbourMessage, OutputModeHolder, PointerMessage,
    SensorMessage, SessionIdHolder, SymbolMessage, TokenMessage, TreeAssociationMessage,
    ViewportMessage,
};
use tuio2_types::timetag::Timetag;
use tuio2_types::topology::{SensorPurpose, TranslationMode};

use crate::bundle::{Arg, Record};
use crate::error::{WireError, WireResult};
use crate::graph_codec::{decode_link_topology, encode_link_topology, AssocKind};

fn uuid_to_blob(uuid: Uuid128) -> Vec<u8> {
    uuid.0.to_be_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> WireResult<Uuid128> {
    let bytes: [u8; 16] = blob
        .try_into()
        .map_err(|_| WireError::Truncated("uuid blob"))?;
    Ok(Uuid128(u128::from_be_bytes(bytes)))
}

fn expect_int(args: &[Arg], i: usize, path: &str) -> WireResult<i32> {
    match args.get(i) {
        Some(Arg::Int(v)) => Ok(*v),
        _ => Err(WireError::TypeTagMismatch {
            path: path.to_owned(),
            type_tags: String::new(),
        }),
    }
}

fn expect_float(args: &[Arg], i: usize, path: &str) -> WireResult<f32> {
    match args.get(i) {
        Some(Arg::Float(v)) => Ok(*v),
        _ => Err(WireError::TypeTagMismatch {
            path: path.to_owned(),
            type_tags: String::new(),
        }),
    }
}

fn expect_str<'a>(args: &'a [Arg], i: usize, path: &str) -> WireResult<&'a str> {
    match args.get(i) {
        Some(Arg::Str(v)) => Ok(v.as_str()),
        _ => Err(WireError::TypeTagMismatch {
            path: path.to_owned(),
            type_tags: String::new(),
        }),
    }
}

fn expect_blob<'a>(args: &'a [Arg], i: usize, path: &str) -> WireResult<&'a [u8]> {
    match args.get(i) {
        Some(Arg::Blob(v)) => Ok(v.as_slice()),
        _ => Err(WireError::TypeTagMismatch {
            path: path.to_owned(),
            type_tags: String::new(),
        }),
    }
}

fn translation_mode_of(v: i32) -> TranslationMode {
    match v {
        1 => TranslationMode::SetupOnce,
        2 => TranslationMode::SetupContinuous,
        _ => TranslationMode::Intact,
    }
}

fn translation_mode_as_i32(m: TranslationMode) -> i32 {
    match m {
        TranslationMode::Intact => 0,
        TranslationMode::SetupOnce => 1,
        TranslationMode::SetupContinuous => 2,
    }
}

fn purpose_of(v: i32) -> SensorPurpose {
    match v {
        1 => SensorPurpose::Observer,
        2 => SensorPurpose::Tagger,
        _ => SensorPurpose::Source,
    }
}

fn purpose_as_i32(p: SensorPurpose) -> i32 {
    match p {
        SensorPurpose::Source => 0,
        SensorPurpose::Observer => 1,
        SensorPurpose::Tagger => 2,
    }
}

/// Encodes a message as one or more wire records. A 2D-or-3D message's
/// output-mode selector decides whether the 2D record, the 3D record, or
/// both are written.
pub fn imprint(message: &Message) -> Vec<Record> {
    match message {
        Message::Frame(m) => vec![Record::new(
            "/tuio2/frm",
            vec![
                Arg::Int(m.frame_id.0 as i32),
                Arg::Time(m.timetag),
                Arg::Int(m.source_address as i32),
                Arg::Int(m.instance_id as i32),
                Arg::Str(m.app_name.clone()),
                Arg::Int(m.sensor_width as i32),
                Arg::Int(m.sensor_height as i32),
            ],
        )],
        Message::AliveSet(m) => vec![Record::new(
            "/tuio2/alv",
            m.session_ids.iter().map(|s| Arg::Int(s.0 as i32)).collect(),
        )],
        Message::Pointer(m) => imprint_pointer(m),
        Message::Token(m) => imprint_token(m),
        Message::Bounds(m) => imprint_bounds(m),
        Message::Symbol(m) => vec![Record::new(
            "/tuio2/sym",
            vec![
                Arg::Int(m.session.session_id.0 as i32),
                Arg::Int(TuId::pack(m.type_user.user_id, m.type_user.type_id).0 as i32),
                Arg::Int(m.component.component_id.0 as i32),
                Arg::Str(m.payload.clone()),
            ],
        )],
        Message::AreaGeometry(m) => vec![imprint_area(m)],
        Message::LinkAssociation(m) => vec![Record::new(
            "/tuio2/lia",
            imprint_association_args(m.session.session_id, AssocKind::Link, &m.topology),
        )],
        Message::ListAssociation(m) => vec![Record::new(
            "/tuio2/lla",
            imprint_association_args(m.session.session_id, AssocKind::List, &m.topology),
        )],
        Message::TreeAssociation(m) => vec![Record::new(
            "/tuio2/lta",
            imprint_association_args(m.session.session_id, AssocKind::Tree, &m.topology),
        )],
        Message::Sensor(m) => vec![Record::new(
            "/dtuio/sensor",
            vec![
                Arg::Blob(uuid_to_blob(m.uuid)),
                Arg::Int(translation_mode_as_i32(m.translation_mode)),
                Arg::Int(purpose_as_i32(m.purpose)),
            ],
        )],
        Message::Viewport(m) => vec![Record::new(
            "/dtuio/viewport",
            vec![
                Arg::Blob(uuid_to_blob(m.uuid)),
                Arg::Float(m.width as f32),
                Arg::Float(m.height as f32),
                Arg::Float(m.center.x as f32),
                Arg::Float(m.center.y as f32),
                Arg::Float(m.orientation as f32),
            ],
        )],
        Message::Group(m) => vec![Record::new(
            "/dtuio/group",
            vec![
                Arg::Blob(uuid_to_blob(m.uuid)),
                Arg::Blob(uuid_to_blob(m.group_uuid)),
            ],
        )],
        Message::Neighbour(m) => vec![Record::new(
            "/dtuio/neighbour",
            vec![
                Arg::Blob(uuid_to_blob(m.uuid)),
                Arg::Blob(uuid_to_blob(m.neighbour_uuid)),
                Arg::Float(m.azimuth as f32),
                Arg::Float(m.altitude as f32),
                Arg::Float(m.distance as f32),
            ],
        )],
    }
}

/// Which record shapes an output-mode selector requires. §4.D: "the
/// output-mode selector dictates whether the 2D record, the 3D record, or
/// both are emitted" — `Both` therefore imprints twice.
fn record_dims(mode: OutputModeHolder) -> &'static [bool] {
    match mode {
        OutputModeHolder::Only2D => &[false],
        OutputModeHolder::Only3D => &[true],
        OutputModeHolder::Both => &[false, true],
    }
}

/// Writes the fixed-length pointer header shared by pointer and token
/// records: session, tu_id, component, output_mode, position. Always the
/// same number of args for a given `force_3d` — no presence marker needed
/// since nothing here is optional. `force_3d` picks the
/// record's own coordinate width, independent of how `m.position` itself
/// was stored (a 2D contact still gets a z=0 3D record when `output_mode`
/// is `Only3D`/`Both`; a 3D contact's z is dropped for its 2D record).
fn push_pointer_header(args: &mut Vec<Arg>, m: &PointerMessage, force_3d: bool) {
    args.push(Arg::Int(m.session.session_id.0 as i32));
    args.push(Arg::Int(TuId::pack(m.type_user.user_id, m.type_user.type_id).0 as i32));
    args.push(Arg::Int(m.component.component_id.0 as i32));
    args.push(Arg::Int(output_mode_as_i32(m.output_mode)));
    push_position(args, m.position, force_3d);
}

/// §4.D's short form: "omits trailing optional arguments when they are all
/// zero". Velocity/accel are pointer's true trailing fields, so an absent
/// one is simply not written; the decoder recovers presence from the
/// record's total argument count (unambiguous: 0, 1, `coord_count` or
/// `coord_count + 1` trailing floats each map to exactly one combination).
fn push_velocity_accel_trailing(args: &mut Vec<Arg>, m: &PointerMessage, force_3d: bool) {
    if let Some(v) = m.velocity {
        push_velocity(args, v, force_3d);
    }
    if let Some(a) = m.accel {
        args.push(Arg::Float(a as f32));
    }
}

/// Token wraps a pointer but appends angle (and optionally rotation) after
/// it, so velocity/accel are no longer the record's trailing fields and
/// the short form can't apply to them without making the tail ambiguous.
/// Token therefore always writes both, defaulting an absent one to zero —
/// only `rotation`, now the true tail, gets the short-form omission.
fn push_velocity_accel_full(args: &mut Vec<Arg>, m: &PointerMessage, force_3d: bool) {
    push_velocity(args, m.velocity.unwrap_or_default(), force_3d);
    args.push(Arg::Float(m.accel.unwrap_or(0.0) as f32));
}

fn imprint_pointer(m: &PointerMessage) -> Vec<Record> {
    record_dims(m.output_mode)
        .iter()
        .map(|&is_3d| {
            let path = if is_3d { "/tuio2/p3d" } else { "/tuio2/ptr" };
            let mut args = Vec::new();
            push_pointer_header(&mut args, m, is_3d);
            push_velocity_accel_trailing(&mut args, m, is_3d);
            Record::new(path, args)
        })
        .collect()
}

fn imprint_token(m: &TokenMessage) -> Vec<Record> {
    let has_rotation =
        m.rotation.rotation_velocity != 0.0 || m.rotation.rotation_accel != 0.0;
    record_dims(m.pointer.output_mode)
        .iter()
        .map(|&is_3d| {
            let path = if is_3d { "/tuio2/t3d" } else { "/tuio2/tok" };
            let mut args = Vec::new();
            push_pointer_header(&mut args, &m.pointer, is_3d);
            push_velocity_accel_full(&mut args, &m.pointer, is_3d);
            args.push(Arg::Float(m.angle.angle as f32));
            if has_rotation {
                args.push(Arg::Float(m.rotation.rotation_velocity as f32));
                args.push(Arg::Float(m.rotation.rotation_accel as f32));
            }
            Record::new(path, args)
        })
        .collect()
}

fn imprint_bounds(m: &BoundsMessage) -> Vec<Record> {
    record_dims(m.output_mode)
        .iter()
        .map(|&is_3d| {
            let path = if is_3d { "/tuio2/b3d" } else { "/tuio2/bnd" };
            let mut args = vec![
                Arg::Int(m.session.session_id.0 as i32),
                Arg::Int(output_mode_as_i32(m.output_mode)),
            ];
            push_position(&mut args, m.position, is_3d);
            args.push(Arg::Float(m.angle.angle as f32));
            args.push(Arg::Float(m.axes.major as f32));
            args.push(Arg::Float(m.axes.minor as f32));
            args.push(Arg::Float(m.area as f32));
            Record::new(path, args)
        })
        .collect()
}

fn imprint_area(m: &AreaGeometryMessage) -> Record {
    let mut args = vec![Arg::Int(m.session.session_id.0 as i32)];
    for span in &m.spans {
        args.push(Arg::Float(span.center.x as f32));
        args.push(Arg::Float(span.center.y as f32));
        args.push(Arg::Float(span.radius as f32));
    }
    Record::new("/tuio2/arg", args)
}

fn imprint_association_args(
    session: SessionId,
    kind: AssocKind,
    topology: &tuio2_types::message::LinkTopology,
) -> Vec<Arg> {
    let mut args = vec![Arg::Int(session.0 as i32)];
    args.extend(encode_link_topology(kind, topology).unwrap_or_default());
    args
}

/// Writes `position` at the width the *record* needs, not the width it
/// happens to be stored at: `force_3d` drops z for a 2D record (even from
/// a `Position::D3`) and supplies z=0 for a 3D record built from a
/// `Position::D2` (§8: "Encoding a 2D-only message with 3D coordinates
/// omits the z component").
fn push_position(args: &mut Vec<Arg>, position: Position, force_3d: bool) {
    if force_3d {
        let p = position.as_point3();
        args.push(Arg::Float(p.x as f32));
        args.push(Arg::Float(p.y as f32));
        args.push(Arg::Float(p.z as f32));
    } else {
        args.push(Arg::Float(position.x() as f32));
        args.push(Arg::Float(position.y() as f32));
    }
}

fn push_velocity(args: &mut Vec<Arg>, v: Velocity3, force_3d: bool) {
    args.push(Arg::Float(v.x as f32));
    args.push(Arg::Float(v.y as f32));
    if force_3d {
        args.push(Arg::Float(v.z as f32));
    }
}

fn output_mode_as_i32(mode: OutputModeHolder) -> i32 {
    match mode {
        OutputModeHolder::Only2D => 0,
        OutputModeHolder::Only3D => 1,
        OutputModeHolder::Both => 2,
    }
}

fn output_mode_from_i32(v: i32) -> OutputModeHolder {
    match v {
        1 => OutputModeHolder::Only3D,
        2 => OutputModeHolder::Both,
        _ => OutputModeHolder::Only2D,
    }
}

/// Parses a single decoded record into zero or more catalogue messages. An
/// unrecognized path yields an empty vector so the caller can log and move
/// on without rejecting the enclosing bundle.
pub fn parse_record(record: &Record) -> WireResult<Vec<Message>> {
    let is_3d = record.path.ends_with("3d");
    match record.path.as_str() {
        "/tuio2/frm" => Ok(vec![Message::Frame(parse_frame(record)?)]),
        "/tuio2/alv" => Ok(vec![Message::AliveSet(parse_alive_set(record)?)]),
        "/tuio2/ptr" | "/tuio2/p3d" => Ok(vec![Message::Pointer(parse_pointer(record, is_3d)?)]),
        "/tuio2/tok" | "/tuio2/t3d" => Ok(vec![Message::Token(parse_token(record, is_3d)?)]),
        "/tuio2/bnd" | "/tuio2/b3d" => Ok(vec![Message::Bounds(parse_bounds(record, is_3d)?)]),
        "/tuio2/sym" => Ok(vec![Message::Symbol(parse_symbol(record)?)]),
        "/tuio2/arg" => Ok(vec![Message::AreaGeometry(parse_area(record)?)]),
        "/tuio2/lia" => Ok(vec![Message::LinkAssociation(parse_link_assoc(record)?)]),
        "/tuio2/lla" => Ok(vec![Message::ListAssociation(parse_list_assoc(record)?)]),
        "/tuio2/lta" => Ok(vec![Message::TreeAssociation(parse_tree_assoc(record)?)]),
        "/dtuio/sensor" => Ok(vec![Message::Sensor(parse_sensor(record)?)]),
        "/dtuio/viewport" => Ok(vec![Message::Viewport(parse_viewport(record)?)]),
        "/dtuio/group" => Ok(vec![Message::Group(parse_group(record)?)]),
        "/dtuio/neighbour" => Ok(vec![Message::Neighbour(parse_neighbour(record)?)]),
        other => {
            tracing::info!(path = other, "parse_rejected: no parser registered for path");
            Ok(Vec::new())
        }
    }
}

fn parse_frame(r: &Record) -> WireResult<FrameMessage> {
    let frame_id = FrameId(expect_int(&r.args, 0, &r.path)? as u32);
    let timetag = match r.args.get(1) {
        Some(Arg::Time(t)) => *t,
        _ => Timetag::IMMEDIATE,
    };
    Ok(FrameMessage {
        frame_id,
        timetag,
        source_address: expect_int(&r.args, 2, &r.path)? as u32,
        instance_id: expect_int(&r.args, 3, &r.path)? as u32,
        app_name: expect_str(&r.args, 4, &r.path)?.to_owned(),
        sensor_width: expect_int(&r.args, 5, &r.path)? as u32,
        sensor_height: expect_int(&r.args, 6, &r.path)? as u32,
    })
}

fn parse_alive_set(r: &Record) -> WireResult<AliveSetMessage> {
    let mut session_ids = Vec::with_capacity(r.args.len());
    for (i, _) in r.args.iter().enumerate() {
        session_ids.push(SessionId(expect_int(&r.args, i, &r.path)? as u32));
    }
    Ok(AliveSetMessage { session_ids })
}

/// Parses the fixed pointer header (session/tu_id/component/output_mode/
/// position) shared by pointer and token records and reports the arg
/// offset right after it, so the caller can read its own variable tail
/// from the right place.
fn parse_pointer_header(
    r: &Record,
    is_3d: bool,
) -> WireResult<(SessionId, TypeId, UserId, ComponentId, OutputModeHolder, Position, usize)> {
    let coord_count = if is_3d { 3 } else { 2 };
    let session = SessionId(expect_int(&r.args, 0, &r.path)? as u32);
    let tu_id = TuId(expect_int(&r.args, 1, &r.path)? as u32);
    let (user_id, type_id) = tu_id.unpack();
    let component = ComponentId(expect_int(&r.args, 2, &r.path)? as u32);
    let output_mode = output_mode_from_i32(expect_int(&r.args, 3, &r.path)?);
    let position = read_position(r, 4, is_3d)?;
    Ok((session, type_id, user_id, component, output_mode, position, 4 + coord_count))
}

/// Recovers pointer's trailing velocity/accel from the record's total
/// argument count, the inverse of [`push_velocity_accel_trailing`]: the
/// four possible trailing lengths (0, 1, `coord_count`, `coord_count + 1`)
/// each name exactly one combination of (velocity present, accel present).
fn parse_velocity_accel_trailing(
    r: &Record,
    header_len: usize,
    is_3d: bool,
) -> WireResult<(Option<Velocity3>, Option<f64>)> {
    let coord_count = if is_3d { 3 } else { 2 };
    let tail_len = r.args.len().saturating_sub(header_len);
    if tail_len == 0 {
        Ok((None, None))
    } else if tail_len == 1 {
        Ok((None, Some(expect_float(&r.args, header_len, &r.path)? as f64)))
    } else if tail_len == coord_count {
        Ok((Some(read_velocity(r, header_len, is_3d)?), None))
    } else if tail_len == coord_count + 1 {
        let v = read_velocity(r, header_len, is_3d)?;
        let a = expect_float(&r.args, header_len + coord_count, &r.path)? as f64;
        Ok((Some(v), Some(a)))
    } else {
        Err(WireError::TypeTagMismatch {
            path: r.path.clone(),
            type_tags: String::new(),
        })
    }
}

fn parse_pointer(r: &Record, is_3d: bool) -> WireResult<PointerMessage> {
    let (session, type_id, user_id, component, output_mode, position, header_len) =
        parse_pointer_header(r, is_3d)?;
    let (velocity, accel) = parse_velocity_accel_trailing(r, header_len, is_3d)?;
    Ok(PointerMessage {
        session: SessionIdHolder { session_id: session },
        type_user: type_user_of(type_id, user_id),
        component: component_of(component),
        position,
        velocity,
        accel,
        output_mode,
    })
}

fn parse_token(r: &Record, is_3d: bool) -> WireResult<TokenMessage> {
    let coord_count = if is_3d { 3 } else { 2 };
    let (session, type_id, user_id, component, output_mode, position, header_len) =
        parse_pointer_header(r, is_3d)?;
    // Token always writes velocity/accel in full (see push_velocity_accel_full);
    // they are never this record's trailing optional fields.
    let velocity = read_velocity(r, header_len, is_3d)?;
    let accel = expect_float(&r.args, header_len + coord_count, &r.path)? as f64;
    let after_pointer = header_len + coord_count + 1;

    let angle = expect_float(&r.args, after_pointer, &r.path)? as f64;
    let after_angle = after_pointer + 1;

    let rotation_tail = r.args.len().saturating_sub(after_angle);
    let rotation = if rotation_tail == 0 {
        tuio2_types::message::RotationHolder::default()
    } else if rotation_tail == 2 {
        tuio2_types::message::RotationHolder {
            rotation_velocity: expect_float(&r.args, after_angle, &r.path)? as f64,
            rotation_accel: expect_float(&r.args, after_angle + 1, &r.path)? as f64,
        }
    } else {
        return Err(WireError::TypeTagMismatch {
            path: r.path.clone(),
            type_tags: String::new(),
        });
    };

    Ok(TokenMessage {
        pointer: PointerMessage {
            session: SessionIdHolder { session_id: session },
            type_user: type_user_of(type_id, user_id),
            component: component_of(component),
            position,
            velocity: Some(velocity),
            accel: Some(accel),
            output_mode,
        },
        angle: tuio2_types::message::AngleHolder { angle },
        rotation,
    })
}

fn parse_bounds(r: &Record, is_3d: bool) -> WireResult<BoundsMessage> {
    let session = SessionId(expect_int(&r.args, 0, &r.path)? as u32);
    let output_mode = output_mode_from_i32(expect_int(&r.args, 1, &r.path)?);
    let position = read_position(r, 2, is_3d)?;
    let coord_count = if is_3d { 3 } else { 2 };
    let base = 2 + coord_count;
    let angle = expect_float(&r.args, base, &r.path)? as f64;
    let major = expect_float(&r.args, base + 1, &r.path)? as f64;
    let minor = expect_float(&r.args, base + 2, &r.path)? as f64;
    let area = expect_float(&r.args, base + 3, &r.path)? as f64;
    Ok(BoundsMessage {
        session: SessionIdHolder { session_id: session },
        position,
        angle: tuio2_types::message::AngleHolder { angle },
        axes: tuio2_types::message::EllipseAxesHolder { major, minor },
        area,
        output_mode,
    })
}

fn parse_symbol(r: &Record) -> WireResult<SymbolMessage> {
    let session = SessionId(expect_int(&r.args, 0, &r.path)? as u32);
    let tu_id = TuId(expect_int(&r.args, 1, &r.path)? as u32);
    let (user_id, type_id) = tu_id.unpack();
    let component = ComponentId(expect_int(&r.args, 2, &r.path)? as u32);
    let payload = expect_str(&r.args, 3, &r.path)?.to_owned();
    Ok(SymbolMessage {
        session: SessionIdHolder { session_id: session },
        type_user: type_user_of(type_id, user_id),
        component: component_of(component),
        payload,
    })
}

fn parse_area(r: &Record) -> WireResult<AreaGeometryMessage> {
    let session = SessionId(expect_int(&r.args, 0, &r.path)? as u32);
    let mut spans = Vec::new();
    let mut i = 1;
    while i + 2 < r.args.len() + 1 && i < r.args.len() {
        let x = expect_float(&r.args, i, &r.path)? as f64;
        let y = expect_float(&r.args, i + 1, &r.path)? as f64;
        let radius = expect_float(&r.args, i + 2, &r.path)? as f64;
        spans.push(DiscSpan {
            center: Point2::new(x, y),
            radius,
        });
        i += 3;
    }
    Ok(AreaGeometryMessage {
        session: SessionIdHolder { session_id: session },
        spans,
    })
}

fn parse_link_assoc(r: &Record) -> WireResult<LinkAssociationMessage> {
    let session = SessionId(expect_int(&r.args, 0, &r.path)? as u32);
    let topology = decode_link_topology(AssocKind::Link, &r.args[1..])?;
    Ok(LinkAssociationMessage {
        session: SessionIdHolder { session_id: session },
        topology,
    })
}

fn parse_list_assoc(r: &Record) -> WireResult<ListAssociationMessage> {
    let session = SessionId(expect_int(&r.args, 0, &r.path)? as u32);
    let topology = decode_link_topology(AssocKind::List, &r.args[1..])?;
    Ok(ListAssociationMessage {
        session: SessionIdHolder { session_id: session },
        topology,
    })
}

fn parse_tree_assoc(r: &Record) -> WireResult<TreeAssociationMessage> {
    let session = SessionId(expect_int(&r.args, 0, &r.path)? as u32);
    let topology = decode_link_topology(AssocKind::Tree, &r.args[1..])?;
    Ok(TreeAssociationMessage {
        session: SessionIdHolder { session_id: session },
        topology,
    })
}

fn parse_sensor(r: &Record) -> WireResult<SensorMessage> {
    Ok(SensorMessage {
        uuid: blob_to_uuid(expect_blob(&r.args, 0, &r.path)?)?,
        translation_mode: translation_mode_of(expect_int(&r.args, 1, &r.path)?),
        purpose: purpose_of(expect_int(&r.args, 2, &r.path)?),
    })
}

fn parse_viewport(r: &Record) -> WireResult<ViewportMessage> {
    Ok(ViewportMessage {
        uuid: blob_to_uuid(expect_blob(&r.args, 0, &r.path)?)?,
        width: expect_float(&r.args, 1, &r.path)? as f64,
        height: expect_float(&r.args, 2, &r.path)? as f64,
        center: Point2::new(
            expect_float(&r.args, 3, &r.path)? as f64,
            expect_float(&r.args, 4, &r.path)? as f64,
        ),
        orientation: expect_float(&r.args, 5, &r.path)? as f64,
    })
}

fn parse_group(r: &Record) -> WireResult<GroupMessage> {
    Ok(GroupMessage {
        uuid: blob_to_uuid(expect_blob(&r.args, 0, &r.path)?)?,
        group_uuid: blob_to_uuid(expect_blob(&r.args, 1, &r.path)?)?,
    })
}

fn parse_neighbour(r: &Record) -> WireResult<NeighbourMessage> {
    Ok(NeighbourMessage {
        uuid: blob_to_uuid(expect_blob(&r.args, 0, &r.path)?)?,
        neighbour_uuid: blob_to_uuid(expect_blob(&r.args, 1, &r.path)?)?,
        azimuth: expect_float(&r.args, 2, &r.path)? as f64,
        altitude: expect_float(&r.args, 3, &r.path)? as f64,
        distance: expect_float(&r.args, 4, &r.path)? as f64,
    })
}

fn read_position(r: &Record, offset: usize, is_3d: bool) -> WireResult<Position> {
    let x = expect_float(&r.args, offset, &r.path)? as f64;
    let y = expect_float(&r.args, offset + 1, &r.path)? as f64;
    if is_3d {
        let z = expect_float(&r.args, offset + 2, &r.path)? as f64;
        Ok(Position::D3(Point3::new(x, y, z)))
    } else {
        Ok(Position::D2(Point2::new(x, y)))
    }
}

fn read_velocity(r: &Record, offset: usize, is_3d: bool) -> WireResult<Velocity3> {
    let x = expect_float(&r.args, offset, &r.path)? as f64;
    let y = expect_float(&r.args, offset + 1, &r.path)? as f64;
    let z = if is_3d {
        expect_float(&r.args, offset + 2, &r.path)? as f64
    } else {
        0.0
    };
    Ok(Velocity3 { x, y, z })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio2_types::message::{ComponentIdHolder, OutputModeHolder, TypeUser};

    #[test]
    fn pointer_round_trips_without_velocity() {
        let msg = Message::Pointer(PointerMessage {
            session: SessionIdHolder {
                session_id: SessionId(7),
            },
            type_user: TypeUser::default(),
            component: ComponentIdHolder::default(),
            position: Position::D2(Point2::new(100.0, 200.0)),
            velocity: None,
            accel: None,
            output_mode: OutputModeHolder::Only2D,
        });
        let records = imprint(&msg);
        assert_eq!(records.len(), 1);
        let parsed = parse_record(&records[0]).unwrap();
        assert_eq!(parsed.len(), 1);
        match &parsed[0] {
            Message::Pointer(p) => {
                assert_eq!(p.session.session_id, SessionId(7));
                assert_eq!(p.position, Position::D2(Point2::new(100.0, 200.0)));
                assert!(p.velocity.is_none());
            }
            _ => panic!("expected pointer"),
        }
    }

    #[test]
    fn pointer_round_trips_with_velocity() {
        let msg = Message::Pointer(PointerMessage {
            session: SessionIdHolder {
                session_id: SessionId(1),
            },
            type_user: TypeUser::default(),
            component: ComponentIdHolder::default(),
            position: Position::D2(Point2::new(1.0, 2.0)),
            velocity: Some(Velocity3 {
                x: 0.5,
                y: -0.25,
                z: 0.0,
            }),
            accel: None,
            output_mode: OutputModeHolder::Only2D,
        });
        let records = imprint(&msg);
        let parsed = parse_record(&records[0]).unwrap();
        match &parsed[0] {
            Message::Pointer(p) => {
                let v = p.velocity.unwrap();
                assert!((v.x - 0.5).abs() < 1e-5);
                assert!((v.y - (-0.25)).abs() < 1e-5);
            }
            _ => panic!("expected pointer"),
        }
    }

    #[test]
    fn unknown_path_yields_no_messages() {
        let record = Record::new("/not/in/catalogue", vec![]);
        assert!(parse_record(&record).unwrap().is_empty());
    }

    #[test]
    fn accel_only_short_form_omits_velocity() {
        let msg = Message::Pointer(PointerMessage {
            session: SessionIdHolder {
                session_id: SessionId(2),
            },
            type_user: TypeUser::default(),
            component: ComponentIdHolder::default(),
            position: Position::D2(Point2::new(1.0, 1.0)),
            velocity: None,
            accel: Some(3.5),
            output_mode: OutputModeHolder::Only2D,
        });
        let records = imprint(&msg);
        let parsed = parse_record(&records[0]).unwrap();
        match &parsed[0] {
            Message::Pointer(p) => {
                assert!(p.velocity.is_none());
                assert!((p.accel.unwrap() - 3.5).abs() < 1e-5);
            }
            _ => panic!("expected pointer"),
        }
    }

    #[test]
    fn only_3d_pointer_with_3d_position_imprints_single_3d_record_with_z() {
        let msg = Message::Pointer(PointerMessage {
            session: SessionIdHolder {
                session_id: SessionId(9),
            },
            type_user: TypeUser::default(),
            component: ComponentIdHolder::default(),
            position: Position::D3(tuio2_types::coords::Point3::new(1.0, 2.0, 3.0)),
            velocity: None,
            accel: None,
            output_mode: OutputModeHolder::Only2D,
        });
        let records = imprint(&msg);
        assert_eq!(records.len(), 1, "Only2D always imprints exactly one record");
        assert_eq!(records[0].path, "/tuio2/ptr", "2D output mode drops z even for a D3 position");
        let parsed = parse_record(&records[0]).unwrap();
        match &parsed[0] {
            Message::Pointer(p) => assert_eq!(p.position, Position::D2(Point2::new(1.0, 2.0))),
            _ => panic!("expected pointer"),
        }
    }

    #[test]
    fn both_output_mode_imprints_one_2d_and_one_3d_record() {
        let msg = Message::Pointer(PointerMessage {
            session: SessionIdHolder {
                session_id: SessionId(4),
            },
            type_user: TypeUser::default(),
            component: ComponentIdHolder::default(),
            position: Position::D2(Point2::new(5.0, 6.0)),
            velocity: None,
            accel: None,
            output_mode: OutputModeHolder::Both,
        });
        let records = imprint(&msg);
        assert_eq!(records.len(), 2);
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert!(paths.contains(&"/tuio2/ptr"));
        assert!(paths.contains(&"/tuio2/p3d"));
        for record in &records {
            let parsed = parse_record(record).unwrap();
            match &parsed[0] {
                Message::Pointer(p) => assert_eq!(p.output_mode, OutputModeHolder::Both),
                _ => panic!("expected pointer"),
            }
        }
    }

    #[test]
    fn token_round_trips_without_rotation() {
        let msg = Message::Token(TokenMessage {
            pointer: PointerMessage {
                session: SessionIdHolder {
                    session_id: SessionId(5),
                },
                type_user: TypeUser::default(),
                component: ComponentIdHolder::default(),
                position: Position::D2(Point2::new(10.0, 20.0)),
                velocity: None,
                accel: None,
                output_mode: OutputModeHolder::Only2D,
            },
            angle: tuio2_types::message::AngleHolder { angle: 1.25 },
            rotation: tuio2_types::message::RotationHolder::default(),
        });
        let records = imprint(&msg);
        assert_eq!(records.len(), 1);
        let parsed = parse_record(&records[0]).unwrap();
        match &parsed[0] {
            Message::Token(t) => {
                assert_eq!(t.pointer.session.session_id, SessionId(5));
                assert!((t.angle.angle - 1.25).abs() < 1e-5);
                assert_eq!(t.rotation.rotation_velocity, 0.0);
                assert_eq!(t.rotation.rotation_accel, 0.0);
            }
            _ => panic!("expected token"),
        }
    }

    #[test]
    fn token_round_trips_with_rotation() {
        let msg = Message::Token(TokenMessage {
            pointer: PointerMessage {
                session: SessionIdHolder {
                    session_id: SessionId(6),
                },
                type_user: TypeUser::default(),
                component: ComponentIdHolder::default(),
                position: Position::D2(Point2::new(0.0, 0.0)),
                velocity: None,
                accel: None,
                output_mode: OutputModeHolder::Only2D,
            },
            angle: tuio2_types::message::AngleHolder { angle: 0.5 },
            rotation: tuio2_types::message::RotationHolder {
                rotation_velocity: 0.1,
                rotation_accel: 0.2,
            },
        });
        let records = imprint(&msg);
        let parsed = parse_record(&records[0]).unwrap();
        match &parsed[0] {
            Message::Token(t) => {
                assert!((t.rotation.rotation_velocity - 0.1).abs() < 1e-5);
                assert!((t.rotation.rotation_accel - 0.2).abs() < 1e-5);
            }
            _ => panic!("expected token"),
        }
    }

    #[test]
    fn bounds_only_3d_imprints_single_3d_record() {
        let msg = Message::Bounds(BoundsMessage {
            session: SessionIdHolder {
                session_id: SessionId(8),
            },
            position: Position::D2(Point2::new(1.0, 1.0)),
            angle: tuio2_types::message::AngleHolder { angle: 0.0 },
            axes: tuio2_types::message::EllipseAxesHolder {
                major: 10.0,
                minor: 5.0,
            },
            area: 39.3,
            output_mode: OutputModeHolder::Only3D,
        });
        let records = imprint(&msg);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "/tuio2/b3d");
        let parsed = parse_record(&records[0]).unwrap();
        match &parsed[0] {
            Message::Bounds(b) => assert_eq!(b.position, Position::D3(tuio2_types::coords::Point3::new(1.0, 1.0, 0.0))),
            _ => panic!("expected bounds"),
        }
    }
}
