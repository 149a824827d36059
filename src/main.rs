// RobotConfigurator - 命令行入口
// 充当界面层：读取字段、调用引擎、显示返回的状态文本

use anyhow::{bail, Result};
use clap::Parser;

use robot_configurator::deploy::build_patch_commands;
use robot_configurator::fields::RobotFields;
use robot_configurator::models::FieldMap;
use robot_configurator::{Configurator, Namespace};

mod cli;

use cli::{Cli, Commands, Toggle};

#[tokio::main]
async fn main() -> Result<()> {
    // 可以通过 RUST_LOG 环境变量控制日志级别，例如：RUST_LOG=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut engine = Configurator::open(cli.config_dir.as_deref())?;
    engine.load_all()?;

    match cli.command {
        Commands::Show => {
            let snapshot = engine.snapshot();
            for ns in Namespace::ALL {
                println!("[{}]", ns);
                for (key, value) in snapshot.namespace(ns) {
                    println!("  {} = {}", key, value);
                }
            }
        }
        Commands::Save { namespace, fields } => {
            let ns: Namespace = namespace.into();
            let mut current = engine.snapshot().namespace(ns).clone();
            current.extend(fields);
            engine.save_namespace(ns, current)?;
            println!("Saved {}", ns);
        }
        Commands::StepId { delta, mirror } => {
            engine.restore_mirror(mirror);
            let mut robot = engine.robot_fields();
            let updates = engine.adjust_identifier(delta, &robot);
            if updates.is_empty() {
                println!("Robot number '{}' is not a number, nothing changed", robot.robot_number);
                return Ok(());
            }
            updates.apply(&mut robot);
            save_robot_fields(&mut engine, &robot)?;
            println!("robot_number = {}, ip = {}", robot.robot_number, robot.ip);
        }
        Commands::Mirror { state } => {
            let mut robot = engine.robot_fields();
            let updates = engine.toggle_mirror(state == Toggle::On, &robot);
            updates.apply(&mut robot);
            if updates.robot_number.is_some() {
                save_robot_fields(&mut engine, &robot)?;
            }
            if let Some(caption) = updates.mirror_caption {
                println!("{}", caption);
            }
            println!("robot_number = {}", robot.robot_number);
        }
        Commands::Gateway { address } => {
            let mut network = engine.snapshot().namespace(Namespace::Network).clone();
            network.insert("gateway".to_string(), address.clone());
            engine.save_namespace(Namespace::Network, network)?;

            let mut robot = engine.robot_fields();
            let updates = engine.on_gateway_edited(&address, &robot);
            if updates.robot_ip.is_some() {
                updates.apply(&mut robot);
                save_robot_fields(&mut engine, &robot)?;
            }
            println!("gateway = {}, robot ip = {}", address, robot.ip);
        }
        Commands::MaskStep { delta } => {
            let mut network = engine.snapshot().namespace(Namespace::Network).clone();
            let mask = network.get("subnet_mask").cloned().unwrap_or_default();
            let Some(mask) = engine.nudge_subnet_mask(&mask, delta) else {
                println!("Subnet mask '{}' is malformed, nothing changed", mask);
                return Ok(());
            };
            network.insert("subnet_mask".to_string(), mask.clone());
            engine.save_namespace(Namespace::Network, network)?;
            println!("subnet_mask = {}", mask);
        }
        Commands::Check => match engine.check_connectivity().await {
            Ok(output) => println!("Connected: {}", output),
            Err(e) => bail!("Connection check failed: {}", e),
        },
        Commands::Push => {
            let result = engine.push_config().await?;
            for entry in &result.log {
                println!("{}", entry.format_line());
            }
            for line in result.status_lines() {
                println!("{}", line);
            }
            if !result.is_success() {
                bail!("Push completed with errors");
            }
        }
        Commands::PatchPreview => {
            let remote_path = &engine.settings().remote.config_path;
            for command in build_patch_commands(engine.snapshot(), remote_path) {
                println!("# {}", command.label());
                println!("{}", command.command);
            }
        }
        Commands::Restart { yes } => {
            if !yes {
                bail!("Restart requires confirmation, re-run with --yes");
            }
            match engine.restart().await {
                Ok(message) => println!("{}", message),
                Err(e) => bail!("{}", e),
            }
        }
    }

    Ok(())
}

/// 把派生字段写回 robot 命名空间
fn save_robot_fields(engine: &mut Configurator, robot: &RobotFields) -> Result<()> {
    let mut fields: FieldMap = engine.snapshot().namespace(Namespace::Robot).clone();
    fields.insert("robot_number".to_string(), robot.robot_number.clone());
    fields.insert("ip".to_string(), robot.ip.clone());
    engine.save_namespace(Namespace::Robot, fields)?;
    Ok(())
}
