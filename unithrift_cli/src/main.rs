//! UniThrift 校园二手市场 CLI 工具
//!
//! 每个子命令对应前端的一个页面：读取参数代替表单，打印代替渲染。

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use unithrift_core::categories::CATEGORY_DROPDOWN_SIZE;
use unithrift_core::interaction::INTERESTED_PAGE_SIZE;
use unithrift_core::listing::{ALL_LISTINGS_PAGE_SIZE, BROWSE_PAGE_SIZE};
use unithrift_core::*;

#[derive(Parser)]
#[command(name = "unithrift")]
#[command(about = "UniThrift 校园二手市场客户端", long_about = None)]
struct Cli {
    /// 服务器地址（默认读取 UNITHRIFT_SERVER_URL）
    #[arg(short, long)]
    server: Option<String>,

    /// 会话文件路径
    #[arg(long, env = "UNITHRIFT_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// 请求超时（秒）
    #[arg(long)]
    timeout: Option<u64>,

    /// 不验证 TLS 证书
    #[arg(long)]
    insecure: bool,

    /// 日志详细程度（-v info，-vv debug）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Student,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Student => Role::Student,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    New,
    OnHold,
    Sold,
}

impl From<StatusArg> for ListingStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::New => ListingStatus::New,
            StatusArg::OnHold => ListingStatus::OnHold,
            StatusArg::Sold => ListingStatus::Sold,
        }
    }
}

#[derive(Args)]
struct Credentials {
    /// 邮箱
    #[arg(short, long)]
    email: String,
    /// 密码
    #[arg(short, long)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 学校列表
    Universities {
        /// 搜索关键字
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// 学生注册（成功后发送验证码）
    Signup {
        #[command(flatten)]
        credentials: Credentials,
        /// 确认密码
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// 学校 ID（见 universities）
        #[arg(long)]
        university_id: String,
        /// 学校名称
        #[arg(long)]
        university: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
    },
    /// 管理员注册（成功后发送验证码）
    SignupAdmin {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        university_id: String,
        #[arg(long)]
        university_name: String,
    },
    /// 校验账号验证码
    VerifyOtp {
        #[arg(value_enum, long, default_value = "student")]
        role: RoleArg,
        #[command(flatten)]
        credentials: Credentials,
        /// 验证码
        #[arg(long)]
        otp: String,
    },
    /// 发送找回密码验证码
    ForgotPassword {
        #[arg(value_enum, long, default_value = "student")]
        role: RoleArg,
        #[arg(short, long)]
        email: String,
    },
    /// 用验证码重置密码
    ResetPassword {
        #[arg(value_enum, long, default_value = "student")]
        role: RoleArg,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        otp: String,
        /// 新密码
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// 登录
    Login {
        #[arg(value_enum, long, default_value = "student")]
        role: RoleArg,
        #[command(flatten)]
        credentials: Credentials,
    },
    /// 登出
    Logout,
    /// 个人资料
    Profile {
        #[arg(value_enum, long, default_value = "student")]
        role: RoleArg,
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// 全部商品（服务端分页）
    Listings {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// 按分类过滤
        #[arg(long)]
        category: Option<String>,
    },
    /// 浏览商品（客户端分页）
    Browse {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// 我发布的商品
    MyListings {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// 商品详情
    Show {
        listing_id: String,
    },
    /// 发布商品
    CreateListing {
        #[arg(long)]
        title: String,
        /// 分类 ID（见 categories list）
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: String,
        /// 图片文件（jpeg/jpg/png），可多次指定
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// 编辑商品
    UpdateListing {
        listing_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(value_enum, long)]
        status: Option<StatusArg>,
    },
    /// 删除商品
    DeleteListing {
        listing_id: String,
    },
    /// 标记感兴趣
    Interest {
        listing_id: String,
        /// 留言
        #[arg(short, long, default_value = "")]
        comments: String,
    },
    /// 我感兴趣的商品
    Interested {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// 商品的交互记录
    Interactions {
        listing_id: String,
    },
    /// 向买家分享联系方式
    ShareContact {
        listing_id: String,
        buyer_id: String,
    },
    /// 拒绝买家
    Reject {
        listing_id: String,
        buyer_id: String,
    },
    /// 与买家成交
    SaleComplete {
        listing_id: String,
        buyer_id: String,
    },
    /// 商品分类
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// 学生列表（管理员）
    Students {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// 分析图表（Chart.js 配置）
    Analytics {
        /// 营收目标
        #[arg(long, default_value_t = 1000.0)]
        revenue_target: f64,
    },
    /// 交易历史
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// 修改资料，只发送填写了的字段
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    List {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Show {
        category_id: String,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    Update {
        category_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    Delete {
        category_id: String,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    Sold {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    Purchased {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// 已售商品详情
    Show {
        listing_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ClientConfig::from_env()?;
    if let Some(server) = cli.server.clone() {
        config.server_url = server;
    }
    if cli.timeout.is_some() {
        config.timeout = cli.timeout;
    }
    if cli.insecure {
        config.verify_tls = false;
    }

    let session_path = cli
        .session_file
        .clone()
        .unwrap_or_else(FileSessionStore::default_path);
    let client = MarketClient::new(config, Arc::new(FileSessionStore::new(session_path)))?;

    match cli.command {
        Commands::Universities { query, page, page_size } => {
            do_universities(&client, query.as_deref(), page, page_size).await?;
        }
        Commands::Signup {
            credentials,
            confirm_password,
            first_name,
            last_name,
            university_id,
            university,
            phone,
            address,
        } => {
            let form = StudentSignup {
                first_name,
                last_name,
                email: credentials.email,
                university,
                university_id,
                phone,
                address,
                password: credentials.password,
            };
            do_signup(&client, form, &confirm_password).await?;
        }
        Commands::SignupAdmin {
            credentials,
            confirm_password,
            first_name,
            last_name,
            university_id,
            university_name,
        } => {
            let form = AdminSignup {
                first_name,
                last_name,
                email: credentials.email,
                university_id,
                university_name,
                password: credentials.password,
            };
            do_signup_admin(&client, form, &confirm_password).await?;
        }
        Commands::VerifyOtp { role, credentials, otp } => {
            do_verify_otp(&client, role.into(), &credentials, &otp).await?;
        }
        Commands::ForgotPassword { role, email } => {
            do_forgot_password(&client, role.into(), &email).await?;
        }
        Commands::ResetPassword {
            role,
            email,
            otp,
            new_password,
            confirm_password,
        } => {
            do_reset_password(&client, role.into(), &email, &otp, &new_password, &confirm_password).await?;
        }
        Commands::Login { role, credentials } => {
            do_login(&client, role.into(), &credentials).await?;
        }
        Commands::Logout => {
            do_logout(&client)?;
        }
        Commands::Profile { role, action } => match action {
            None => do_profile(&client, role.into()).await?,
            Some(ProfileAction::Update {
                first_name,
                last_name,
                phone,
                address,
            }) => {
                let update = ProfileUpdate {
                    first_name,
                    last_name,
                    phone,
                    address,
                };
                do_update_profile(&client, role.into(), update).await?;
            }
        },
        Commands::Listings { page, category } => {
            do_listings(&client, page, category.as_deref()).await?;
        }
        Commands::Browse { page } => {
            do_browse(&client, page).await?;
        }
        Commands::MyListings { page } => {
            do_my_listings(&client, page).await?;
        }
        Commands::Show { listing_id } => {
            do_show(&client, &listing_id).await?;
        }
        Commands::CreateListing {
            title,
            category,
            description,
            price,
            images,
        } => {
            let form = NewListing {
                title,
                category_id: category,
                description,
                price,
            };
            do_create_listing(&client, &form, &images).await?;
        }
        Commands::UpdateListing {
            listing_id,
            title,
            description,
            price,
            status,
        } => {
            do_update_listing(&client, &listing_id, title, description, price, status.map(Into::into)).await?;
        }
        Commands::DeleteListing { listing_id } => {
            do_delete_listing(&client, &listing_id).await?;
        }
        Commands::Interest { listing_id, comments } => {
            do_interest(&client, &listing_id, &comments).await?;
        }
        Commands::Interested { page } => {
            do_interested(&client, page).await?;
        }
        Commands::Interactions { listing_id } => {
            do_interactions(&client, &listing_id).await?;
        }
        Commands::ShareContact { listing_id, buyer_id } => {
            let message = client.share_contact(&listing_id, &buyer_id).await?;
            println!("{}", message);
        }
        Commands::Reject { listing_id, buyer_id } => {
            let message = client.reject_interest(&listing_id, &buyer_id).await?;
            println!("{}", message);
        }
        Commands::SaleComplete { listing_id, buyer_id } => {
            let message = client.mark_sale_complete(&listing_id, &buyer_id).await?;
            println!("{}", message);
        }
        Commands::Categories { action } => {
            do_categories(&client, action).await?;
        }
        Commands::Students { page, page_size } => {
            do_students(&client, page, page_size).await?;
        }
        Commands::Analytics { revenue_target } => {
            do_analytics(&client, revenue_target).await?;
        }
        Commands::History { action } => {
            do_history(&client, action).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn do_universities(client: &MarketClient, query: Option<&str>, page: u32, page_size: u32) -> anyhow::Result<()> {
    let universities = client.get_universities(page, page_size, query).await?;
    if universities.is_empty() {
        println!("没有找到学校");
    }
    for university in universities {
        println!("{}  {}", university.id, university);
    }
    Ok(())
}

async fn do_signup(client: &MarketClient, form: StudentSignup, confirm_password: &str) -> anyhow::Result<()> {
    let email = form.email.clone();
    println!("正在注册: {}", email);
    client.signup_student(form, confirm_password).await?;
    println!("注册成功! 验证码已发送到 {}", email);
    println!("请运行: unithrift verify-otp --email {} --password <密码> --otp <验证码>", email);
    Ok(())
}

async fn do_signup_admin(client: &MarketClient, form: AdminSignup, confirm_password: &str) -> anyhow::Result<()> {
    let email = form.email.clone();
    println!("正在注册管理员: {}", email);
    client.signup_admin(form, confirm_password).await?;
    println!("注册成功! 验证码已发送到 {}", email);
    Ok(())
}

async fn do_verify_otp(client: &MarketClient, role: Role, credentials: &Credentials, otp: &str) -> anyhow::Result<()> {
    client
        .verify_otp(
            role,
            &credentials.email,
            otp,
            &credentials.password,
            VerificationType::Authentication,
        )
        .await?;
    println!("账号验证成功，请登录");
    Ok(())
}

async fn do_forgot_password(client: &MarketClient, role: Role, email: &str) -> anyhow::Result<()> {
    if email.trim().is_empty() {
        bail!("请输入邮箱");
    }
    client.send_otp(role, email, VerificationType::ForgotPassword).await?;
    println!("验证码已发送到 {}", email);
    Ok(())
}

async fn do_reset_password(
    client: &MarketClient,
    role: Role,
    email: &str,
    otp: &str,
    new_password: &str,
    confirm_password: &str,
) -> anyhow::Result<()> {
    if new_password != confirm_password {
        bail!("两次输入的密码不一致");
    }
    client
        .verify_otp(role, email, otp, new_password, VerificationType::ForgotPassword)
        .await?;
    println!("密码已重置，请重新登录");
    Ok(())
}

async fn do_login(client: &MarketClient, role: Role, credentials: &Credentials) -> anyhow::Result<()> {
    println!("正在登录: {}", credentials.email);
    let session = client
        .login(role, &credentials.email, &credentials.password)
        .await?;
    println!("登录成功!");
    if !session.user_id.is_empty() {
        println!("用户ID: {}", session.user_id);
    }
    Ok(())
}

fn do_logout(client: &MarketClient) -> anyhow::Result<()> {
    client.logout()?;
    println!("已登出");
    Ok(())
}

async fn do_profile(client: &MarketClient, role: Role) -> anyhow::Result<()> {
    let profile = match role {
        Role::Student => serde_json::to_string_pretty(&client.get_student().await?)?,
        Role::Admin => serde_json::to_string_pretty(&client.get_admin().await?)?,
    };
    println!("{}", profile);
    Ok(())
}

async fn do_update_profile(client: &MarketClient, role: Role, update: ProfileUpdate) -> anyhow::Result<()> {
    client.update_profile(role, update).await?;
    println!("资料已更新");
    Ok(())
}

fn print_listing(listing: &Listing) {
    println!(
        "{}  {:<30} ${:<8.2} {:<8} {}",
        listing.id, listing.title, listing.price, listing.status, listing.item_name
    );
}

fn print_pager_footer(page: u32, total_pages: u32, has_back: bool, has_next: bool) {
    let mut footer = format!("-- 第 {}/{} 页", page, total_pages.max(1));
    if has_back {
        footer.push_str(&format!("  [上一页: --page {}]", page - 1));
    }
    if has_next {
        footer.push_str(&format!("  [下一页: --page {}]", page + 1));
    }
    println!("{}", footer);
}

async fn do_listings(client: &MarketClient, page: u32, category: Option<&str>) -> anyhow::Result<()> {
    let page = page.max(1);
    let result = client
        .get_listings_page(page, ALL_LISTINGS_PAGE_SIZE, category)
        .await?;
    if result.items.is_empty() {
        println!("暂无商品");
    }
    result.items.iter().for_each(print_listing);
    if let Some(total) = result.total_items {
        println!("共 {} 件商品", total);
    }
    let total_pages = result
        .total_items
        .map(|t| u32::try_from(t.div_ceil(u64::from(ALL_LISTINGS_PAGE_SIZE))).unwrap_or(u32::MAX))
        .unwrap_or(page);
    print_pager_footer(page, total_pages, result.has_back(), result.has_next());
    Ok(())
}

async fn do_browse(client: &MarketClient, page: u32) -> anyhow::Result<()> {
    let user_id = client.current_user_id()?;
    let listings = client.fetch_all_listings(BROWSE_PAGE_SIZE).await?;
    let pager = ClientPager::new(listings, BROWSE_PAGE_SIZE)?.with_page(page);
    if pager.is_empty() {
        println!("暂无商品");
        return Ok(());
    }
    for listing in pager.page_items() {
        print_listing(listing);
        let affordances = ListingAffordances::for_viewer(listing, &user_id);
        if affordances.can_edit {
            println!("    (我的商品)");
        }
    }
    print_pager_footer(pager.page(), pager.total_pages(), pager.has_back(), pager.has_next());
    Ok(())
}

async fn do_my_listings(client: &MarketClient, page: u32) -> anyhow::Result<()> {
    let listings = client.fetch_all_user_listings(BROWSE_PAGE_SIZE).await?;
    let pager = ClientPager::new(listings, BROWSE_PAGE_SIZE)?.with_page(page);
    if pager.is_empty() {
        println!("你还没有发布商品");
        return Ok(());
    }
    pager.page_items().iter().for_each(print_listing);
    print_pager_footer(pager.page(), pager.total_pages(), pager.has_back(), pager.has_next());
    Ok(())
}

async fn do_show(client: &MarketClient, listing_id: &str) -> anyhow::Result<()> {
    let user_id = client.current_user_id()?;
    let detail = client.get_listing_detail(listing_id).await?;
    let listing = &detail.listing;

    println!("{}", listing.title);
    println!("  分类: {}", listing.item_name);
    println!("  价格: ${:.2}", listing.price);
    println!("  状态: {}", listing.status);
    println!("  描述: {}", listing.description);
    for url in &detail.image_urls {
        println!("  图片: {}", url);
    }

    let interactions = client.get_listing_interactions(listing_id).await?;
    let affordances = ListingAffordances::for_viewer(listing, &user_id);
    if affordances.can_edit {
        println!("  [可编辑] unithrift update-listing {}", listing.id);
    }
    if affordances.can_delete {
        println!("  [可删除] unithrift delete-listing {}", listing.id);
    }

    match &interactions {
        ListingInteractions::Seller(buyers) => print_buyers(listing_id, buyers),
        ListingInteractions::Buyer(own) => {
            let button = MarkInterestButton::derive(listing, &user_id, Some(&interactions));
            if button != MarkInterestButton::Hidden {
                println!("  [{}]", button.label());
            }
            if let Some(status) = own.status {
                println!("  我的状态: {}", status);
            }
            if let Some(contact) = own.seller_contact() {
                println!("  卖家: {}  {}  {}", contact.name, contact.email, contact.phone);
            }
        }
    }
    Ok(())
}

fn print_buyers(listing_id: &str, buyers: &[BuyerInterest]) {
    if buyers.is_empty() {
        println!("  暂无买家感兴趣");
        return;
    }
    println!("  感兴趣的买家:");
    for buyer in buyers {
        println!(
            "    {}  {:<20} {:<14} {}",
            buyer.buyer_id, buyer.buyer_name, buyer.status, buyer.comments
        );
        let actions = SellerActions::for_status(buyer.status);
        if actions.share_contact {
            println!("      unithrift share-contact {} {}", listing_id, buyer.buyer_id);
        }
        if actions.reject {
            println!("      unithrift reject {} {}", listing_id, buyer.buyer_id);
        }
        if actions.sale_complete {
            println!("      unithrift sale-complete {} {}", listing_id, buyer.buyer_id);
        }
    }
}

async fn do_create_listing(client: &MarketClient, form: &NewListing, paths: &[PathBuf]) -> anyhow::Result<()> {
    form.validate()?;
    let images = paths
        .iter()
        .map(|p| ImageUpload::from_path(p).with_context(|| format!("无法读取图片 {}", p.display())))
        .collect::<anyhow::Result<Vec<_>>>()?;

    println!("正在发布商品: {}", form.title);
    let listing_id = client.create_listing(form, images).await?;
    println!("发布成功! 商品ID: {}", listing_id);
    Ok(())
}

async fn do_update_listing(
    client: &MarketClient,
    listing_id: &str,
    title: Option<String>,
    description: Option<String>,
    price: Option<String>,
    status: Option<ListingStatus>,
) -> anyhow::Result<()> {
    let price = price.map(|p| parse_price(&p)).transpose()?;
    let listing = client.get_listing(listing_id).await?;

    let state = EditorState::default().open(&listing)?.edit(|draft| {
        if let Some(title) = title {
            draft.title = title;
        }
        if let Some(description) = description {
            draft.description = description;
        }
        if let Some(price) = price {
            draft.price = price;
        }
        if let Some(status) = status {
            draft.status = status;
        }
    })?;
    let (state, changes) = state.submit()?;

    let outcome = client.update_listing(listing_id, &changes).await;
    match state.finish(&outcome)? {
        EditorState::Closed => {
            println!("商品已更新");
            Ok(())
        }
        EditorState::Failed { message, .. } => Err(anyhow!("更新失败: {}", message)),
        other => Err(anyhow!("编辑器状态异常: {}", other.name())),
    }
}

async fn do_delete_listing(client: &MarketClient, listing_id: &str) -> anyhow::Result<()> {
    let message = client.delete_listing(listing_id).await?;
    println!("{}", message);
    Ok(())
}

async fn do_interest(client: &MarketClient, listing_id: &str, comments: &str) -> anyhow::Result<()> {
    match client.mark_interested(listing_id, comments).await? {
        MarkInterestOutcome::Marked(message) => println!("{}", message),
        MarkInterestOutcome::AlreadyInterested(reason) => println!("无法标记: {}", reason),
    }
    Ok(())
}

async fn do_interested(client: &MarketClient, page: u32) -> anyhow::Result<()> {
    let items = client.fetch_all_interested(INTERESTED_PAGE_SIZE).await?;
    let pager = ClientPager::new(items, INTERESTED_PAGE_SIZE)?.with_page(page);
    if pager.is_empty() {
        println!("你还没有感兴趣的商品");
        return Ok(());
    }
    for item in pager.page_items() {
        println!(
            "{}  {:<30} {:<14} {}",
            item.listing_id,
            item.title.as_deref().unwrap_or("N/A"),
            item.status.map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string()),
            item.comments.as_deref().unwrap_or(""),
        );
    }
    print_pager_footer(pager.page(), pager.total_pages(), pager.has_back(), pager.has_next());
    Ok(())
}

async fn do_interactions(client: &MarketClient, listing_id: &str) -> anyhow::Result<()> {
    match client.get_listing_interactions(listing_id).await? {
        ListingInteractions::Seller(buyers) => print_buyers(listing_id, &buyers),
        ListingInteractions::Buyer(own) => match own.status {
            None => println!("你还没有标记这件商品"),
            Some(status) => {
                println!("状态: {}", status);
                if let Some(comments) = &own.comments {
                    println!("留言: {}", comments);
                }
                if let Some(contact) = own.seller_contact() {
                    println!("卖家: {}  {}  {}", contact.name, contact.email, contact.phone);
                }
            }
        },
    }
    Ok(())
}

async fn do_categories(client: &MarketClient, action: CategoryAction) -> anyhow::Result<()> {
    match action {
        CategoryAction::List { query, page } => {
            let categories = client
                .get_categories(page, CATEGORY_DROPDOWN_SIZE, query.as_deref())
                .await?;
            for category in categories {
                println!("{}  {:<20} {}", category.id, category.item_name, category.item_description);
            }
        }
        CategoryAction::Show { category_id } => {
            let category = client.get_category(&category_id).await?;
            println!("{}", serde_json::to_string_pretty(&category)?);
        }
        CategoryAction::Add { name, description } => {
            client.add_category(&name, &description).await?;
            println!("分类已添加");
        }
        CategoryAction::Update {
            category_id,
            name,
            description,
        } => {
            client.update_category(&category_id, &name, &description).await?;
            println!("分类已更新");
        }
        CategoryAction::Delete { category_id } => {
            client.delete_category(&category_id).await?;
            println!("分类已删除");
        }
    }
    Ok(())
}

async fn do_students(client: &MarketClient, page: u32, page_size: u32) -> anyhow::Result<()> {
    let students = client.get_all_students(page, page_size).await?;
    for student in students {
        println!(
            "{}  {} {:<16} {:<30} {}",
            student.id, student.first_name, student.last_name, student.email, student.university
        );
    }
    Ok(())
}

async fn do_analytics(client: &MarketClient, revenue_target: f64) -> anyhow::Result<()> {
    let analytics = client.analytics().await?;
    let mut charts = serde_json::Map::new();
    charts.insert("mostListed".to_string(), serde_json::to_value(analytics.most_listed_chart())?);
    charts.insert("mostInquired".to_string(), serde_json::to_value(analytics.most_inquired_chart())?);
    match analytics.revenue_chart(revenue_target) {
        Some(chart) => {
            charts.insert("totalRevenue".to_string(), serde_json::to_value(chart)?);
        }
        None => eprintln!("暂无成交，不生成营收图表"),
    }
    println!("{}", serde_json::to_string_pretty(&charts)?);
    Ok(())
}

async fn do_history(client: &MarketClient, action: HistoryAction) -> anyhow::Result<()> {
    let listings = match action {
        HistoryAction::Sold { page, page_size } => client.get_sold_listings(page, page_size).await?,
        HistoryAction::Purchased { page, page_size } => client.get_purchased_listings(page, page_size).await?,
        HistoryAction::Show { listing_id } => {
            let detail = client.get_history_listing(&listing_id).await?;
            print_listing(&detail.listing);
            println!("  卖家: {}", detail.seller_name);
            println!("  买家: {}", detail.buyer_name);
            println!("  留言: {}", detail.buyer_comments);
            return Ok(());
        }
    };
    if listings.is_empty() {
        println!("暂无记录");
    }
    listings.iter().for_each(print_listing);
    Ok(())
}
