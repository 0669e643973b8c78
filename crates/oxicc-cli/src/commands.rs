use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use oxicc_core::settings::{self, SettingsStore};
use oxicc_core::{
    Device, DeviceClassTable, IdCheck, LoadFlags, Profile, ProfileContext, RankMap, SignatureKind,
    select_profile,
};

use crate::args::{DeviceArgs, DumpKind};

/// Everything a command prints, emitted only after it succeeded
pub enum Output {
    Text(String),
    Bytes(Vec<u8>),
}

const AUTOMATIC: &str = "automatic";

fn inspect_flags() -> LoadFlags {
    LoadFlags {
        no_repair: true,
        ..LoadFlags::uncached()
    }
}

fn fourcc(value: u32) -> String {
    value
        .to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

pub fn info(ctx: &ProfileContext, name: &Path) -> anyhow::Result<Output> {
    let profile = ctx
        .from_file(name, inspect_flags())
        .with_context(|| format!("cannot load {}", name.display()))?;
    let mut out = String::new();

    if let Some(path) = profile.file_name() {
        writeln!(out, "File:         {}", path.display())?;
    }
    if let Some(description) = profile.description() {
        writeln!(out, "Description:  {description}")?;
    }
    let version = profile.version();
    writeln!(
        out,
        "Version:      {}.{}.{}",
        version.major, version.minor, version.patch
    )?;
    for (label, kind) in [
        ("Class", SignatureKind::Class),
        ("Color space", SignatureKind::ColorSpace),
        ("PCS", SignatureKind::Pcs),
        ("CMM", SignatureKind::Cmm),
        ("Platform", SignatureKind::Platform),
        ("Manufacturer", SignatureKind::Manufacturer),
        ("Model", SignatureKind::Model),
        ("Creator", SignatureKind::Creator),
    ] {
        writeln!(out, "{:<14}'{}'", format!("{label}:"), fourcc(profile.signature(kind)))?;
    }
    writeln!(out, "Channels:     {}", profile.channel_names().join(" "))?;
    writeln!(out, "Size:         {}", profile.signature(SignatureKind::Size))?;

    let id = match profile.check_id() {
        IdCheck::Valid => format!("{} (valid)", profile.identity(false)),
        IdCheck::Missing => format!("missing, computed {}", profile.identity(true)),
        IdCheck::Mismatch { embedded, computed } => {
            format!("{embedded} does not match computed {computed}")
        }
    };
    writeln!(out, "Profile ID:   {id}")?;

    writeln!(out, "\nTags: {}", profile.tag_count())?;
    for (i, tag) in profile.tags().enumerate() {
        writeln!(
            out,
            "{i:3} {} {} offset {:>8} size {:>8}{}",
            tag.signature(),
            tag.type_signature(),
            tag.offset().unwrap_or_default(),
            tag.declared_size(),
            if tag.is_corrupted() { " corrupted" } else { "" }
        )?;
    }
    Ok(Output::Text(out))
}

fn load_device(args: &DeviceArgs, store: &dyn SettingsStore) -> anyhow::Result<Device> {
    let text = fs::read_to_string(&args.device)
        .with_context(|| format!("cannot read {}", args.device.display()))?;
    let mut device = Device::from_openicc_json(&text, args.class.as_deref(), args.pos)?;

    device.rank_map = match &args.rank_map {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            Some(RankMap::from_json(&text, 0)?)
        }
        None => settings::stored_rank_map(store, &device)?,
    };
    if device.rank_map.is_none() {
        log::warn!("no rank map for {}, all ranks are 0", device.settings_key());
    }
    Ok(device)
}

/// Profiles of the device's profile class, best ranked first
fn ranked_profiles(
    ctx: &ProfileContext,
    device: &Device,
) -> (oxicc_core::ProfileList, Vec<i32>) {
    let class = DeviceClassTable::default().profile_class(&device.class);
    let pattern = Profile::from_signature(class.to_u32(), SignatureKind::Class);
    let mut list = ctx.profiles(&[pattern], LoadFlags::default());
    let ranks = list.device_rank(device, ctx.policy());
    (list, ranks)
}

pub fn list(
    ctx: &ProfileContext,
    store: &dyn SettingsStore,
    args: &DeviceArgs,
) -> anyhow::Result<Output> {
    let device = load_device(args, store)?;
    let (list, ranks) = ranked_profiles(ctx, &device);

    let mut out = String::new();
    for (rank, profile) in ranks.iter().zip(list.iter()) {
        writeln!(
            out,
            "{rank}: {} ({})",
            profile.description().unwrap_or_default(),
            profile
                .file_name()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )?;
    }
    Ok(Output::Text(out))
}

fn stored_name(profile: &Profile) -> anyhow::Result<String> {
    profile
        .file_name()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .context("profile has no file name")
}

pub fn assign(
    ctx: &ProfileContext,
    store: &mut dyn SettingsStore,
    args: &DeviceArgs,
    name: &str,
) -> anyhow::Result<Output> {
    let device = load_device(args, store)?;
    let profile = if name == AUTOMATIC {
        let (list, _) = ranked_profiles(ctx, &device);
        let best = select_profile(&device, list.iter().map(|p| p.as_ref()), None, ctx.policy())
            .with_context(|| format!("no profile ranks above 0 for {}", device.settings_key()))?;
        stored_name(best)?
    } else {
        let profile = ctx
            .from_file(Path::new(name), LoadFlags::default())
            .with_context(|| format!("cannot load {name}"))?;
        stored_name(&profile)?
    };

    settings::assign_profile(store, &device, Some(&profile))?;
    Ok(Output::Text(format!("{}: {profile}\n", device.settings_key())))
}

pub fn unassign(store: &mut dyn SettingsStore, args: &DeviceArgs) -> anyhow::Result<Output> {
    let device = load_device(args, store)?;
    settings::assign_profile(store, &device, None)?;
    Ok(Output::Text(String::new()))
}

pub fn setup(
    ctx: &ProfileContext,
    store: &mut dyn SettingsStore,
    args: &DeviceArgs,
    name: Option<&str>,
) -> anyhow::Result<Output> {
    let device = load_device(args, store)?;
    let name = match name {
        Some(name) => name.to_string(),
        None => settings::assigned_profile(store, &device).unwrap_or_else(|| AUTOMATIC.to_string()),
    };
    assign(ctx, store, args, &name)
}

pub fn dump(
    ctx: &ProfileContext,
    store: &dyn SettingsStore,
    args: &DeviceArgs,
    kind: DumpKind,
) -> anyhow::Result<Output> {
    let device = load_device(args, store)?;
    match kind {
        DumpKind::Icc => {
            let name = settings::assigned_profile(store, &device)
                .with_context(|| format!("no profile assigned to {}", device.settings_key()))?;
            let profile = ctx.from_file(Path::new(&name), LoadFlags::default())?;
            Ok(Output::Bytes(profile.to_bytes()))
        }
        DumpKind::Openicc => {
            let json = Device::to_openicc_json(std::slice::from_ref(&device));
            Ok(Output::Text(serde_json::to_string_pretty(&json)? + "\n"))
        }
        DumpKind::OpeniccRankMap => {
            let Some(rank_map) = &device.rank_map else {
                bail!("no rank map for {}", device.settings_key());
            };
            let json = rank_map.to_json(&device.class);
            Ok(Output::Text(serde_json::to_string_pretty(&json)? + "\n"))
        }
    }
}

pub fn fix_id(ctx: &ProfileContext, name: &Path) -> anyhow::Result<Output> {
    let path = ctx
        .search_paths()
        .resolve(name)
        .with_context(|| format!("cannot find {}", name.display()))?;
    let mut profile = Profile::read_file(&path, inspect_flags())?;
    let before = profile.check_id();
    let id = profile.repair_id();
    profile.write_to_file(&path)?;

    let note = match before {
        IdCheck::Valid => "unchanged",
        IdCheck::Missing => "added",
        IdCheck::Mismatch { .. } => "replaced",
    };
    Ok(Output::Text(format!("{}: {id} ({note})\n", path.display())))
}
